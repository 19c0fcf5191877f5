//! The auto-framing sniffer loop.
//!
//! [`AutoFrameSniffer`] turns a continuous, possibly noisy byte stream into
//! dumped frames without knowing the framing discipline in advance. Each
//! iteration:
//!
//! 1. suspends on the transport until bytes arrive (zero read = remote
//!    closed, loop ends);
//! 2. races every configured codec over a copy of the buffered prefix and
//!    keeps the list from whichever codec decoded the most frames;
//! 3. if nothing parsed, dumps the whole prefix as one unparsed blob;
//!    otherwise dumps the winner's frames in decode order;
//! 4. compacts the unconsumed tail to the front of the buffer and loops.
//!
//! # Buffer discipline
//!
//! The receive buffer is owned exclusively by the loop and reused across
//! reads. No slice into it survives a suspension point — decoded frames are
//! owned [`Bytes`] copies and everything else carried across an `await` is
//! a plain length. The compaction step is a forward overlapping move
//! (destination offset 0, source offset ≥ 0), which `copy_within` defines.
//!
//! # Cancellation
//!
//! The loop honours a [`CancellationToken`] between iterations and during
//! the suspended receive. Dumper calls, once started, run to completion;
//! buffered partial frames die with the task.

use bytes::Bytes;
use chrono::Utc;
use framesift_codecs::{DelimitedCodec, FixedLengthCodec, FrameCodec, LengthFieldCodec, LengthFieldConfig, StxEtxCodec};
use framesift_core::constants::{FLAG_BYTE, LF, RECV_BUFFER_SIZE};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::dumper::{FrameDumper, RX_TAG};
use crate::transport::Transport;

/// Errors that can terminate a sniffer run.
#[derive(Debug, Error)]
pub enum SnifferError {
    /// The transport failed mid-receive.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The dumper refused or failed to persist a frame.
    #[error("Dump failed: {0}")]
    Dump(#[from] framesift_core::Error),
}

/// The codec set a sniffer races by default: line-oriented, STX/ETX,
/// HDLC-style flag framing, a 2-byte big-endian length field, and two
/// fixed-size disciplines common on industrial links.
pub fn default_codecs() -> Vec<Box<dyn FrameCodec>> {
    let length_field = LengthFieldCodec::new(LengthFieldConfig {
        length_bytes: 2,
        big_endian: true,
        length_offset: 0,
        header_size: None,
        max_frame_size: 4096,
    })
    .expect("default length-field parameters are valid");

    vec![
        Box::new(DelimitedCodec::new(None, LF)),
        Box::new(StxEtxCodec::new()),
        Box::new(DelimitedCodec::new(Some(FLAG_BYTE), FLAG_BYTE)),
        Box::new(length_field),
        Box::new(FixedLengthCodec::new(8).expect("8 is a valid frame size")),
        Box::new(FixedLengthCodec::new(16).expect("16 is a valid frame size")),
    ]
}

/// Streaming sniffer that frames a transport's receive side and dumps every
/// frame it can extract.
///
/// The sniffer owns its transport, dumper and codec list for the lifetime
/// of the run; [`run`](AutoFrameSniffer::run) consumes `self` and drives
/// the loop until the remote closes, the token is cancelled, or an error
/// surfaces.
#[derive(Debug)]
pub struct AutoFrameSniffer<T, D> {
    transport: T,
    dumper: D,
    codecs: Vec<Box<dyn FrameCodec>>,
    cancel: CancellationToken,
    sequence: u64,
}

impl<T: Transport, D: FrameDumper> AutoFrameSniffer<T, D> {
    /// Create a sniffer racing the [`default_codecs`] set.
    pub fn new(transport: T, dumper: D, cancel: CancellationToken) -> Self {
        Self::with_codecs(transport, dumper, cancel, default_codecs())
    }

    /// Create a sniffer racing a caller-chosen codec set.
    pub fn with_codecs(
        transport: T,
        dumper: D,
        cancel: CancellationToken,
        codecs: Vec<Box<dyn FrameCodec>>,
    ) -> Self {
        Self {
            transport,
            dumper,
            codecs,
            cancel,
            sequence: 0,
        }
    }

    /// Drive the receive/decode/dump loop to completion.
    ///
    /// Returns `Ok(())` on remote close or cancellation.
    pub async fn run(mut self) -> Result<(), SnifferError> {
        let remote = self.transport.remote_label().to_string();
        let started_at = Utc::now();
        info!(remote = %remote, codecs = self.codecs.len(), "sniffer started");

        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];
        let mut filled = 0usize;

        loop {
            let read = tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(remote = %remote, "sniffer cancelled");
                    break;
                }
                read = self.transport.receive(&mut buffer[filled..]) => read?,
            };
            if read == 0 {
                debug!(remote = %remote, "remote closed");
                break;
            }
            filled += read;
            trace!(remote = %remote, read, filled, "received");

            // race the codecs over a copy of the filled prefix; only the
            // owned frames and the remainder length leave this call
            let (frames, remainder) = race_codecs(&mut self.codecs, &buffer[..filled]);

            if frames.is_empty() {
                // nothing parses yet under any discipline: surface the whole
                // prefix as a single unparsed blob and start over
                let blob = Bytes::copy_from_slice(&buffer[..filled]);
                filled = 0;
                self.sequence += 1;
                let sequence = self.sequence;
                self.dumper.dump(RX_TAG, &remote, sequence, &blob).await?;
                continue;
            }

            for frame in frames {
                self.sequence += 1;
                let sequence = self.sequence;
                self.dumper.dump(RX_TAG, &remote, sequence, &frame).await?;
            }

            // forward-safe overlapping move of the unconsumed tail
            buffer.copy_within(filled - remainder..filled, 0);
            filled = remainder;
        }

        let uptime_secs = (Utc::now() - started_at).num_seconds();
        info!(
            remote = %remote,
            records = self.sequence,
            uptime_secs,
            "sniffer stopped"
        );
        Ok(())
    }
}

/// Decode as many frames as possible with each codec on its own copy of
/// `prefix` and return the best list plus its remainder length.
///
/// Most frames wins; ties go to the earlier codec. An empty list means no
/// codec decoded anything.
fn race_codecs(codecs: &mut [Box<dyn FrameCodec>], prefix: &[u8]) -> (Vec<Bytes>, usize) {
    let mut best: Option<(Vec<Bytes>, usize)> = None;

    for codec in codecs.iter_mut() {
        let mut view = prefix;
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(&mut view) {
            frames.push(frame);
        }
        if frames.is_empty() {
            continue;
        }
        if best.as_ref().is_none_or(|(b, _)| frames.len() > b.len()) {
            best = Some((frames, view.len()));
        }
    }

    best.unwrap_or((Vec::new(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_prefers_most_frames() {
        let mut codecs = default_codecs();
        // two newline frames beat one 16-byte fixed frame
        let (frames, remainder) = race_codecs(&mut codecs, b"12345678\nabcdefg\n");

        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0][..], b"12345678\n");
        assert_eq!(&frames[1][..], b"abcdefg\n");
        assert_eq!(remainder, 0);
    }

    #[test]
    fn test_race_reports_remainder() {
        let mut codecs: Vec<Box<dyn FrameCodec>> =
            vec![Box::new(FixedLengthCodec::new(4).expect("valid size"))];
        let (frames, remainder) = race_codecs(&mut codecs, &[1, 2, 3, 4, 5, 6]);

        assert_eq!(frames.len(), 1);
        assert_eq!(remainder, 2);
    }

    #[test]
    fn test_race_with_nothing_decodable() {
        let mut codecs: Vec<Box<dyn FrameCodec>> = vec![Box::new(StxEtxCodec::new())];
        let (frames, remainder) = race_codecs(&mut codecs, b"no markers");

        assert!(frames.is_empty());
        assert_eq!(remainder, 0);
    }

    #[test]
    fn test_race_tie_goes_to_first_codec() {
        let mut codecs: Vec<Box<dyn FrameCodec>> = vec![
            Box::new(FixedLengthCodec::new(4).expect("valid size")),
            Box::new(FixedLengthCodec::new(3).expect("valid size")),
        ];
        // 4 bytes: each codec decodes exactly one frame
        let (frames, _) = race_codecs(&mut codecs, &[1, 2, 3, 4]);

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[1, 2, 3, 4]);
    }
}
