//! STX/ETX bracketed frame codec.

use crate::codec::FrameCodec;
use bytes::{BufMut, Bytes, BytesMut};
use framesift_core::Result;
use framesift_core::constants::{END_BYTE, START_BYTE};

/// Codec for `STX … ETX` bracketed frames.
///
/// The emitted frame is the bytes strictly between the markers; decoding
/// advances past the ETX, consuming any garbage that preceded the STX along
/// the way. Unlike [`DelimitedCodec`](crate::DelimitedCodec) this codec
/// never drops bytes while waiting for its markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StxEtxCodec;

impl StxEtxCodec {
    pub fn new() -> Self {
        Self
    }
}

impl FrameCodec for StxEtxCodec {
    fn name(&self) -> &'static str {
        "stx-etx"
    }

    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let mut out = BytesMut::with_capacity(payload.len() + 2);
        out.put_u8(START_BYTE);
        out.put_slice(payload);
        out.put_u8(END_BYTE);
        Ok(out.freeze())
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        let stx = view.iter().position(|&b| b == START_BYTE)?;
        let rel = view[stx + 1..].iter().position(|&b| b == END_BYTE)?;
        let etx = stx + 1 + rel;

        let frame = Bytes::copy_from_slice(&view[stx + 1..etx]);
        *view = &view[etx + 1..];
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_markers() {
        let mut codec = StxEtxCodec::new();
        let mut view: &[u8] = &[0x02, b'h', b'i', 0x03];

        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], b"hi");
        assert!(view.is_empty());
    }

    #[test]
    fn test_garbage_before_stx_is_consumed() {
        let mut codec = StxEtxCodec::new();
        let mut view: &[u8] = &[0xFF, 0xFE, 0x02, b'x', 0x03, b'y'];

        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], b"x");
        assert_eq!(view, b"y");
    }

    #[test]
    fn test_missing_stx_leaves_view() {
        let mut codec = StxEtxCodec::new();
        let mut view: &[u8] = b"plain bytes";

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view, b"plain bytes");
    }

    #[test]
    fn test_missing_etx_leaves_view() {
        let mut codec = StxEtxCodec::new();
        let mut view: &[u8] = &[0x02, b'p', b'a', b'r', b't'];

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view, &[0x02, b'p', b'a', b'r', b't']);
    }

    #[test]
    fn test_empty_frame() {
        let mut codec = StxEtxCodec::new();
        let mut view: &[u8] = &[0x02, 0x03];

        let frame = codec.decode(&mut view).unwrap();
        assert!(frame.is_empty());
        assert!(view.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let mut codec = StxEtxCodec::new();
        let encoded = codec.encode(b"payload").unwrap();
        assert_eq!(encoded[0], 0x02);
        assert_eq!(encoded[encoded.len() - 1], 0x03);

        let mut view: &[u8] = &encoded;
        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], b"payload");
    }
}
