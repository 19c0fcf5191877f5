//! 32-bit big-endian length-prefixed frame codec.

use crate::codec::FrameCodec;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use framesift_core::constants::LENGTH_PREFIX_SIZE;
use framesift_core::{Error, Result};

/// Codec for frames carrying a 4-byte big-endian payload-length prefix.
///
/// The prefix counts payload bytes only and is not part of the emitted
/// frame. A prefix whose value is negative when reinterpreted as a signed
/// 32-bit integer is rejected silently: the decoder reports nothing and
/// leaves the view where it was.
///
/// # Example
///
/// ```
/// use framesift_codecs::{FrameCodec, LengthPrefixedCodec};
///
/// let mut codec = LengthPrefixedCodec::new();
/// let mut view: &[u8] = &[0, 0, 0, 5, b'A', b'B', b'C', b'D', b'E'];
///
/// let frame = codec.decode(&mut view).unwrap();
/// assert_eq!(&frame[..], b"ABCDE");
/// assert!(view.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthPrefixedCodec;

impl LengthPrefixedCodec {
    pub fn new() -> Self {
        Self
    }
}

impl FrameCodec for LengthPrefixedCodec {
    fn name(&self) -> &'static str {
        "length-prefixed"
    }

    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let length = i32::try_from(payload.len()).map_err(|_| {
            Error::InvalidPayload(format!(
                "payload of {} bytes does not fit a signed 32-bit length prefix",
                payload.len()
            ))
        })?;

        let mut out = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
        out.put_u32(length as u32);
        out.put_slice(payload);
        Ok(out.freeze())
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        if view.len() < LENGTH_PREFIX_SIZE {
            return None;
        }

        let mut prefix = *view;
        let length = prefix.get_u32();
        if (length as i32) < 0 {
            return None;
        }

        let total = LENGTH_PREFIX_SIZE + length as usize;
        if view.len() < total {
            return None;
        }

        let frame = Bytes::copy_from_slice(&view[LENGTH_PREFIX_SIZE..total]);
        *view = &view[total..];
        Some(frame)
    }
}
