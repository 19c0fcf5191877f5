//! Constant-size frame codec.

use crate::codec::FrameCodec;
use bytes::Bytes;
use framesift_core::{Error, Result};

/// Codec for frames of a fixed byte length.
///
/// Decoding emits the first `size` bytes of the view whenever at least that
/// many are buffered. Encoding requires the payload to already be exactly
/// `size` bytes; fixed-length framing adds no bytes of its own.
#[derive(Debug, Clone, Copy)]
pub struct FixedLengthCodec {
    size: usize,
}

impl FixedLengthCodec {
    /// Create a codec for frames of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig(
                "fixed-length frame size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl FrameCodec for FixedLengthCodec {
    fn name(&self) -> &'static str {
        "fixed-length"
    }

    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        if payload.len() != self.size {
            return Err(Error::InvalidPayload(format!(
                "fixed-length payload must be exactly {} bytes, got {}",
                self.size,
                payload.len()
            )));
        }
        Ok(Bytes::copy_from_slice(payload))
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        if view.len() < self.size {
            return None;
        }
        let frame = Bytes::copy_from_slice(&view[..self.size]);
        *view = &view[self.size..];
        Some(frame)
    }
}
