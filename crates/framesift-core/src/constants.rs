//! Protocol-level constants shared by the framesift codecs and sniffer.
//!
//! These values pin down the wire formats the codecs speak and the default
//! bounds they enforce. They are centralized here so that the codec crate,
//! the sniffer crate, and downstream users agree on the same numbers.
//!
//! # Organization
//!
//! Constants are grouped by concern:
//!
//! - **Framing bytes** — the single-byte markers used by the delimiter-based
//!   codecs (STX/ETX, newline, HDLC-style flag).
//! - **Size bounds** — default maximum frame sizes and the sniffer's receive
//!   buffer capacity.
//! - **Modbus RTU** — address space, frame bounds and the CRC-16/MODBUS
//!   polynomial parameters.
//! - **Auto-framer** — the scoring and locking defaults of the adaptive
//!   codec.
//!
//! # Usage
//!
//! ```
//! use framesift_core::constants::*;
//!
//! assert_eq!(START_BYTE, 0x02);
//! assert_eq!(MODBUS_CRC_POLY, 0xA001);
//!
//! fn is_unicast_address(addr: u8) -> bool {
//!     (1..=MODBUS_MAX_ADDRESS).contains(&addr)
//! }
//! assert!(is_unicast_address(247));
//! assert!(!is_unicast_address(248));
//! ```

// ============================================================================
// Framing Bytes
// ============================================================================

/// Start-of-text marker (STX) used by STX/ETX framing.
pub const START_BYTE: u8 = 0x02;

/// End-of-text marker (ETX) used by STX/ETX framing.
pub const END_BYTE: u8 = 0x03;

/// Line feed terminator.
pub const LF: u8 = 0x0A;

/// Carriage return terminator.
pub const CR: u8 = 0x0D;

/// HDLC-style flag byte, used as both opening and closing delimiter by
/// frame disciplines in the 0x7E…0x7E family.
pub const FLAG_BYTE: u8 = 0x7E;

// ============================================================================
// Size Bounds
// ============================================================================

/// Default maximum frame size for delimiter-based codecs.
///
/// A delimited decoder that has scanned this many bytes without finding its
/// end marker treats the buffered data as garbage and drops it, bounding the
/// memory a malformed stream can pin.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 8192;

/// Capacity of the sniffer's receive buffer.
///
/// The sniffer never grows past this; unconsumed bytes are compacted to the
/// front of the same buffer between reads.
pub const RECV_BUFFER_SIZE: usize = 8192;

/// Width of the 32-bit big-endian length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of the packet wire header: version(1) + kind(1) + flags(2) +
/// sequence(4) + payload-length(4).
pub const PACKET_HEADER_SIZE: usize = 12;

// ============================================================================
// Modbus RTU
// ============================================================================

/// Maximum total Modbus RTU frame length (address + function + data + CRC).
pub const MODBUS_MAX_FRAME: usize = 260;

/// How many start offsets the Modbus resync scanner will try before giving
/// up on the current buffer contents.
pub const MODBUS_SCAN_LIMIT: usize = 64;

/// Highest valid unicast slave address.
pub const MODBUS_MAX_ADDRESS: u8 = 247;

/// Broadcast slave address, targeting all slaves.
pub const MODBUS_BROADCAST_ADDRESS: u8 = 0;

/// CRC-16/MODBUS polynomial (reflected).
pub const MODBUS_CRC_POLY: u16 = 0xA001;

/// CRC-16/MODBUS initial value.
pub const MODBUS_CRC_INIT: u16 = 0xFFFF;

// ============================================================================
// Auto-Framer Defaults
// ============================================================================

/// Per-frame sanity bound applied to every candidate's output.
pub const AUTO_MAX_FRAME: usize = 4096;

/// Scoring is skipped while the buffered view is shorter than this.
pub const AUTO_MIN_BUFFER: usize = 4;

/// A candidate's scoring run halts after decoding this many frames.
pub const AUTO_MAX_FRAMES_PER_PASS: usize = 64;

/// At most this many frames are queued per winning pass; the rest are
/// counted but dropped.
pub const AUTO_MAX_QUEUE_FRAMES: usize = 16;

/// Per-byte penalty for bytes a candidate leaves unconsumed.
pub const AUTO_REMAINDER_PENALTY: i64 = 2;

/// Consecutive wins required before the auto-framer locks onto a candidate.
pub const AUTO_LOCK_AFTER_HITS: u32 = 3;

/// Minimum frames decoded in the winning pass for that pass to count toward
/// a lock.
pub const AUTO_MIN_FRAMES_TO_LOCK: usize = 2;
