//! Frame sink contract and the reference hex dumper.

use framesift_core::Result;
use tracing::info;

/// Direction tag attached to every frame the sniffer captures.
pub const RX_TAG: &str = "RX";

/// Asynchronous sink that persists captured frames.
///
/// `dump` returns once the record has been persisted; the sniffer awaits
/// every call before touching its receive buffer again, so implementations
/// may borrow `bytes` for the duration of the call but must not retain it.
#[allow(async_fn_in_trait)]
pub trait FrameDumper {
    async fn dump(
        &mut self,
        direction: &str,
        remote: &str,
        sequence: u64,
        bytes: &[u8],
    ) -> Result<()>;
}

/// Reference dumper rendering frames as canonical hex rows through
/// `tracing`.
///
/// Output per frame: one header line with direction, remote and sequence,
/// then 16-bytes-per-row offset / hex / ASCII lines:
///
/// ```text
/// RX 192.168.0.50:9600 #3 (13 bytes)
/// 00000000  01 10 00 00 00 02 04 aa  bb cc dd 62 8e           |...........b.|
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HexDumper;

impl HexDumper {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDumper for HexDumper {
    async fn dump(
        &mut self,
        direction: &str,
        remote: &str,
        sequence: u64,
        bytes: &[u8],
    ) -> Result<()> {
        info!("{direction} {remote} #{sequence} ({} bytes)", bytes.len());
        for line in hex_lines(bytes) {
            info!("{line}");
        }
        Ok(())
    }
}

/// Render `bytes` as 16-byte offset / hex / ASCII rows.
pub fn hex_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let mut hex = String::with_capacity(49);
            for (i, byte) in chunk.iter().enumerate() {
                if i == 8 {
                    hex.push(' ');
                }
                hex.push_str(&format!("{byte:02x} "));
            }

            let ascii: String = chunk
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();

            format!("{:08x}  {:<49} |{}|", row * 16, hex.trim_end(), ascii)
        })
        .collect()
}
