//! Frame codec driven by a configurable length field inside the header.

use crate::codec::FrameCodec;
use bytes::{BufMut, Bytes, BytesMut};
use framesift_core::constants::DEFAULT_MAX_FRAME_SIZE;
use framesift_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`LengthFieldCodec`].
///
/// The length field holds the TOTAL frame length — header plus payload —
/// which is the convention of most binary industrial protocols carrying an
/// explicit size word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthFieldConfig {
    /// Width of the length field in bytes; 1, 2 or 4.
    pub length_bytes: usize,

    /// Byte order of the length field.
    pub big_endian: bool,

    /// Offset of the length field from the start of the frame.
    pub length_offset: usize,

    /// Header size in bytes. `None` means `length_offset + length_bytes`.
    pub header_size: Option<usize>,

    /// Upper bound on the total frame length a header may declare.
    pub max_frame_size: usize,
}

impl Default for LengthFieldConfig {
    fn default() -> Self {
        Self {
            length_bytes: 2,
            big_endian: true,
            length_offset: 0,
            header_size: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Validated width of the length field.
#[derive(Debug, Clone, Copy)]
enum LengthWidth {
    U8,
    U16,
    U32,
}

impl LengthWidth {
    fn from_bytes(length_bytes: usize) -> Result<Self> {
        match length_bytes {
            1 => Ok(Self::U8),
            2 => Ok(Self::U16),
            4 => Ok(Self::U32),
            other => Err(Error::InvalidConfig(format!(
                "length field width must be 1, 2 or 4 bytes, got {other}"
            ))),
        }
    }

    fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    fn max_value(self) -> usize {
        match self {
            Self::U8 => u8::MAX as usize,
            Self::U16 => u16::MAX as usize,
            Self::U32 => u32::MAX as usize,
        }
    }

    fn read(self, field: &[u8], big_endian: bool) -> usize {
        match self {
            Self::U8 => field[0] as usize,
            Self::U16 if big_endian => u16::from_be_bytes([field[0], field[1]]) as usize,
            Self::U16 => u16::from_le_bytes([field[0], field[1]]) as usize,
            Self::U32 if big_endian => {
                u32::from_be_bytes([field[0], field[1], field[2], field[3]]) as usize
            }
            Self::U32 => u32::from_le_bytes([field[0], field[1], field[2], field[3]]) as usize,
        }
    }

    fn write(self, out: &mut [u8], value: usize, big_endian: bool) {
        match self {
            Self::U8 => out[0] = value as u8,
            Self::U16 if big_endian => out[..2].copy_from_slice(&(value as u16).to_be_bytes()),
            Self::U16 => out[..2].copy_from_slice(&(value as u16).to_le_bytes()),
            Self::U32 if big_endian => out[..4].copy_from_slice(&(value as u32).to_be_bytes()),
            Self::U32 => out[..4].copy_from_slice(&(value as u32).to_le_bytes()),
        }
    }
}

/// Codec for frames whose header carries an explicit total-length field.
///
/// # Resync behaviour
///
/// A header declaring a zero length or a length above `max_frame_size`
/// cannot be the start of a frame; the decoder discards exactly one byte
/// and reports nothing, realigning itself one position at a time until a
/// sane header comes to the front.
///
/// # Example
///
/// ```
/// use framesift_codecs::{FrameCodec, LengthFieldCodec, LengthFieldConfig};
///
/// // 2-byte big-endian total length at offset 0
/// let mut codec = LengthFieldCodec::new(LengthFieldConfig::default()).unwrap();
///
/// let mut view: &[u8] = &[0x00, 0x05, b'a', b'b', b'c', b'x'];
/// let frame = codec.decode(&mut view).unwrap();
/// assert_eq!(&frame[..], &[0x00, 0x05, b'a', b'b', b'c']); // header included
/// assert_eq!(view, b"x");
/// ```
#[derive(Debug, Clone)]
pub struct LengthFieldCodec {
    width: LengthWidth,
    big_endian: bool,
    length_offset: usize,
    header_size: usize,
    max_frame_size: usize,
}

impl LengthFieldCodec {
    /// Build a codec from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the field width is not 1, 2 or 4,
    /// or if an explicit header size does not cover the length field.
    pub fn new(config: LengthFieldConfig) -> Result<Self> {
        let width = LengthWidth::from_bytes(config.length_bytes)?;

        let minimum = config.length_offset + width.bytes();
        let header_size = config.header_size.unwrap_or(minimum);
        if header_size < minimum {
            return Err(Error::InvalidConfig(format!(
                "header size {header_size} does not cover a length field ending at byte {minimum}"
            )));
        }

        Ok(Self {
            width,
            big_endian: config.big_endian,
            length_offset: config.length_offset,
            header_size,
            max_frame_size: config.max_frame_size,
        })
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    fn read_length(&self, header: &[u8]) -> usize {
        let field = &header[self.length_offset..self.length_offset + self.width.bytes()];
        self.width.read(field, self.big_endian)
    }
}

impl FrameCodec for LengthFieldCodec {
    fn name(&self) -> &'static str {
        "length-field"
    }

    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let total = self.header_size + payload.len();
        if total > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size: total,
                max_size: self.max_frame_size,
            });
        }
        if total > self.width.max_value() {
            return Err(Error::InvalidPayload(format!(
                "total frame length {total} does not fit a {}-byte length field",
                self.width.bytes()
            )));
        }

        let mut header = vec![0u8; self.header_size];
        self.width
            .write(&mut header[self.length_offset..], total, self.big_endian);

        let mut out = BytesMut::with_capacity(total);
        out.put_slice(&header);
        out.put_slice(payload);
        Ok(out.freeze())
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        if view.len() < self.header_size {
            return None;
        }

        let length = self.read_length(view);
        if length == 0 || length > self.max_frame_size {
            // this byte cannot start a frame; shift by one and retry later
            *view = &view[1..];
            return None;
        }

        if view.len() < length {
            return None;
        }

        let frame = Bytes::copy_from_slice(&view[..length]);
        *view = &view[length..];
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn codec(config: LengthFieldConfig) -> LengthFieldCodec {
        LengthFieldCodec::new(config).unwrap()
    }

    #[test]
    fn test_invalid_width_rejected() {
        let config = LengthFieldConfig {
            length_bytes: 3,
            ..LengthFieldConfig::default()
        };
        assert!(LengthFieldCodec::new(config).is_err());
    }

    #[test]
    fn test_header_size_must_cover_field() {
        let config = LengthFieldConfig {
            length_bytes: 4,
            length_offset: 2,
            header_size: Some(4),
            ..LengthFieldConfig::default()
        };
        assert!(LengthFieldCodec::new(config).is_err());
    }

    #[test]
    fn test_decode_includes_header() {
        let mut codec = codec(LengthFieldConfig::default());
        let mut view: &[u8] = &[0x00, 0x04, 0xAA, 0xBB, 0xCC];

        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], &[0x00, 0x04, 0xAA, 0xBB]);
        assert_eq!(view, &[0xCC]);
    }

    #[test]
    fn test_incomplete_header_untouched() {
        let mut codec = codec(LengthFieldConfig::default());
        let mut view: &[u8] = &[0x00];

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_incomplete_body_untouched() {
        let mut codec = codec(LengthFieldConfig::default());
        let mut view: &[u8] = &[0x00, 0x08, 0x01];

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view.len(), 3);
    }

    #[rstest]
    #[case::zero_length(&[0x00, 0x00, 0x01, 0x02])]
    #[case::oversized(&[0xFF, 0xFF, 0x01, 0x02])]
    fn test_bad_length_discards_one_byte(#[case] input: &[u8]) {
        let mut codec = codec(LengthFieldConfig {
            max_frame_size: 256,
            ..LengthFieldConfig::default()
        });
        let mut view = input;

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view, &input[1..]);
    }

    #[test]
    fn test_resync_finds_frame_after_garbage() {
        let mut codec = codec(LengthFieldConfig {
            max_frame_size: 16,
            ..LengthFieldConfig::default()
        });

        // 0xFF 0xFF declares an oversized frame; the decoder shifts one byte
        // per call until the real header reaches the front
        let data: &[u8] = &[0xFF, 0xFF, 0x00, 0x04, 0x01, 0x02];
        let mut view = data;

        assert!(codec.decode(&mut view).is_none()); // drops 0xFF
        assert!(codec.decode(&mut view).is_none()); // drops 0xFF
        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], &[0x00, 0x04, 0x01, 0x02]);
        assert!(view.is_empty());
    }

    #[test]
    fn test_little_endian_one_byte_width() {
        let mut codec = codec(LengthFieldConfig {
            length_bytes: 1,
            big_endian: false,
            ..LengthFieldConfig::default()
        });
        let mut view: &[u8] = &[0x03, 0xAA, 0xBB];

        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], &[0x03, 0xAA, 0xBB]);
    }

    #[test]
    fn test_length_field_at_offset_with_padding() {
        // 4-byte header: two type bytes, then a 2-byte LE length
        let mut codec = codec(LengthFieldConfig {
            length_bytes: 2,
            big_endian: false,
            length_offset: 2,
            header_size: Some(4),
            ..LengthFieldConfig::default()
        });
        let mut view: &[u8] = &[0x10, 0x20, 0x06, 0x00, 0xAA, 0xBB, 0xCC];

        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(&frame[..], &[0x10, 0x20, 0x06, 0x00, 0xAA, 0xBB]);
        assert_eq!(view, &[0xCC]);
    }

    #[test]
    fn test_encode_writes_total_length() {
        let mut codec = codec(LengthFieldConfig::default());
        let encoded = codec.encode(&[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(&encoded[..], &[0x00, 0x05, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_encode_respects_max_frame() {
        let mut codec = codec(LengthFieldConfig {
            max_frame_size: 4,
            ..LengthFieldConfig::default()
        });
        assert!(codec.encode(&[0; 8]).is_err());
    }

    #[test]
    fn test_roundtrip() {
        let mut codec = codec(LengthFieldConfig::default());
        let encoded = codec.encode(b"data").unwrap();

        let mut view: &[u8] = &encoded;
        let frame = codec.decode(&mut view).unwrap();
        assert_eq!(frame, encoded);
        assert!(view.is_empty());
    }
}
