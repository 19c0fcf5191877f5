//! The uniform frame codec contract.
//!
//! Every framing discipline in this crate — delimiter-based, length-driven,
//! checksum-verified — speaks the same two-operation interface so that codecs
//! can be composed, raced against each other, and swapped behind streams
//! without the caller knowing which discipline is in play.
//!
//! # Decoding model
//!
//! Decoders operate on a *view*: a reborrowable `&mut &[u8]` window over the
//! caller's receive buffer. A decoder consumes bytes by reslicing the
//! referent from the front; the caller observes consumption as the view
//! getting shorter. Decoded frames are owned [`Bytes`] copies, so they stay
//! valid after the caller reuses or compacts the underlying buffer.
//!
//! A decode call has exactly three outcomes:
//!
//! - `Some(frame)` — one frame was extracted and the view has advanced past
//!   every byte the codec consumed, including any garbage it resynchronised
//!   over.
//! - `None` with the view unchanged — not enough bytes yet; retry after more
//!   data arrives.
//! - `None` with the view advanced — the bytes at the front cannot start a
//!   frame and were dropped by the codec's documented resync step.
//!
//! Decoders never panic on malformed input and never report errors through
//! `Result`; the boolean-like `Option` plus view movement is the whole
//! protocol.
//!
//! # Example
//!
//! ```
//! use framesift_codecs::{FixedLengthCodec, FrameCodec};
//!
//! let mut codec = FixedLengthCodec::new(4).unwrap();
//! let mut view: &[u8] = &[1, 2, 3, 4, 5];
//!
//! let frame = codec.decode(&mut view).unwrap();
//! assert_eq!(&frame[..], &[1, 2, 3, 4]);
//! assert_eq!(view, &[5]); // one byte left for the next round
//! ```

use bytes::Bytes;
use framesift_core::Result;
use std::fmt;

/// Bidirectional encoder/decoder for one framing discipline.
///
/// Implementations are synchronous, non-suspending and either stateless or
/// minimally stateful (a sequence counter, a lock decision). They are plain
/// data and move freely across tasks; concurrent use of a single instance is
/// not supported.
///
/// `encode` takes `&mut self` for the same reason tokio-util's
/// [`Encoder`](tokio_util::codec::Encoder) does: codecs that stamp outgoing
/// frames (for example with a sequence number) need to update themselves per
/// call.
pub trait FrameCodec: fmt::Debug + Send {
    /// Short stable identifier, used in the auto-framer's mode string and in
    /// diagnostics.
    fn name(&self) -> &'static str;

    /// Wrap `payload` in this codec's framing discipline.
    ///
    /// Returns a newly allocated byte sequence; the input is never mutated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayload`](framesift_core::Error::InvalidPayload)
    /// when the payload violates a codec precondition (for example a Modbus
    /// RTU payload shorter than address + function).
    fn encode(&mut self, payload: &[u8]) -> Result<Bytes>;

    /// Try to extract one frame from the front of `view`.
    ///
    /// See the [module documentation](self) for the consumption contract.
    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes>;
}
