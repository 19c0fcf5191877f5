//! Line-terminated frame codec accepting LF, CR and CRLF.

use crate::codec::FrameCodec;
use bytes::{BufMut, Bytes, BytesMut};
use framesift_core::Result;
use framesift_core::constants::{CR, LF};

/// Codec for newline-terminated frames.
///
/// Decoding splits on the first LF or CR; a CR immediately followed by LF is
/// consumed as a single CRLF terminator. The terminator is not part of the
/// emitted frame. Encoding appends a single LF.
///
/// # Example
///
/// ```
/// use framesift_codecs::{FrameCodec, NewlineCodec};
///
/// let mut codec = NewlineCodec::new();
/// let mut view: &[u8] = b"AB\r\nCD\n";
///
/// assert_eq!(&codec.decode(&mut view).unwrap()[..], b"AB");
/// assert_eq!(&codec.decode(&mut view).unwrap()[..], b"CD");
/// assert!(view.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NewlineCodec;

impl NewlineCodec {
    pub fn new() -> Self {
        Self
    }
}

impl FrameCodec for NewlineCodec {
    fn name(&self) -> &'static str {
        "newline"
    }

    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let mut out = BytesMut::with_capacity(payload.len() + 1);
        out.put_slice(payload);
        out.put_u8(LF);
        Ok(out.freeze())
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        let pos = view.iter().position(|&b| b == LF || b == CR)?;
        let frame = Bytes::copy_from_slice(&view[..pos]);

        let consumed = if view[pos] == CR && view.get(pos + 1) == Some(&LF) {
            pos + 2
        } else {
            pos + 1
        };
        *view = &view[consumed..];
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::lf(b"hello\nrest".as_slice(), b"hello".as_slice(), b"rest".as_slice())]
    #[case::cr(b"hello\rrest".as_slice(), b"hello".as_slice(), b"rest".as_slice())]
    #[case::crlf(b"hello\r\nrest".as_slice(), b"hello".as_slice(), b"rest".as_slice())]
    fn test_terminator_variants(
        #[case] input: &[u8],
        #[case] expected_frame: &[u8],
        #[case] expected_rest: &[u8],
    ) {
        let mut codec = NewlineCodec::new();
        let mut view = input;

        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], expected_frame);
        assert_eq!(view, expected_rest);
    }

    #[test]
    fn test_crlf_split_yields_two_frames() {
        // CR at the end of the buffer is consumed alone; an LF arriving in a
        // later read then terminates an empty frame
        let mut codec = NewlineCodec::new();

        let mut view: &[u8] = b"AB\r";
        assert_eq!(&codec.decode(&mut view).unwrap()[..], b"AB");
        assert!(view.is_empty());

        let mut view: &[u8] = b"\nCD\n";
        assert_eq!(&codec.decode(&mut view).unwrap()[..], b"");
        assert_eq!(&codec.decode(&mut view).unwrap()[..], b"CD");
    }

    #[test]
    fn test_no_terminator_leaves_view_untouched() {
        let mut codec = NewlineCodec::new();
        let mut view: &[u8] = b"no newline here";

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view, b"no newline here");
    }

    #[test]
    fn test_scenario_crlf_then_lf() {
        let mut codec = NewlineCodec::new();
        let mut view: &[u8] = b"AB\r\nCD\n";

        assert_eq!(&codec.decode(&mut view).unwrap()[..], b"AB");
        assert_eq!(&codec.decode(&mut view).unwrap()[..], b"CD");
        assert!(view.is_empty());
        assert!(codec.decode(&mut view).is_none());
    }

    #[test]
    fn test_encode_appends_single_lf() {
        let mut codec = NewlineCodec::new();
        assert_eq!(&codec.encode(b"hello").unwrap()[..], b"hello\n");
    }

    #[test]
    fn test_roundtrip_strips_terminator() {
        let mut codec = NewlineCodec::new();
        let encoded = codec.encode(b"payload").unwrap();

        let mut view: &[u8] = &encoded;
        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], b"payload");
        assert!(view.is_empty());
    }
}
