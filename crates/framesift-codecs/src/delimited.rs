//! Delimiter-based frame codec.
//!
//! Frames are bracketed by an optional *start byte* and a mandatory *end
//! byte*. With a start byte configured the codec behaves like HDLC-style
//! framings (`0x7E … 0x7E`): bytes before the first start marker are
//! garbage and are dropped, and the emitted frame includes both markers.
//! Without a start byte the codec splits on the end byte alone and the
//! frame is payload plus terminator.

use crate::codec::FrameCodec;
use bytes::{BufMut, Bytes, BytesMut};
use framesift_core::Result;
use framesift_core::constants::{DEFAULT_MAX_FRAME_SIZE, FLAG_BYTE, LF};

/// Codec for start/end-byte bracketed frames.
///
/// # Overflow behaviour
///
/// If the end byte has not appeared after `max_frame_size` bytes, the whole
/// buffered view is cleared: a stream that never produces the end marker
/// must not pin memory. The same applies when a start byte is configured
/// but absent — nothing before a start marker can ever become a frame.
/// The conservative clear-everything variant is kept deliberately; see the
/// notes on [`decode`](FrameCodec::decode).
///
/// # Example
///
/// ```
/// use framesift_codecs::{DelimitedCodec, FrameCodec};
///
/// let mut codec = DelimitedCodec::new(Some(0x7E), 0x7E);
/// let mut view: &[u8] = &[0xAA, 0x7E, 0x01, 0x02, 0x7E, 0xBB];
///
/// let frame = codec.decode(&mut view).unwrap();
/// assert_eq!(&frame[..], &[0x7E, 0x01, 0x02, 0x7E]); // markers included
/// assert_eq!(view, &[0xBB]); // leading garbage consumed too
/// ```
#[derive(Debug, Clone)]
pub struct DelimitedCodec {
    start: Option<u8>,
    end: u8,
    max_frame_size: usize,
}

impl DelimitedCodec {
    /// Create a codec with the default maximum frame size.
    pub fn new(start: Option<u8>, end: u8) -> Self {
        Self {
            start,
            end,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with a custom maximum frame size.
    pub fn with_max_frame_size(start: Option<u8>, end: u8, max_frame_size: usize) -> Self {
        Self {
            start,
            end,
            max_frame_size,
        }
    }

    /// Line-oriented framing: split on LF, no start marker.
    pub fn line_feed() -> Self {
        Self::new(None, LF)
    }

    /// HDLC-style framing: 0x7E opens and closes every frame.
    pub fn flag_delimited() -> Self {
        Self::new(Some(FLAG_BYTE), FLAG_BYTE)
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl FrameCodec for DelimitedCodec {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let mut out = BytesMut::with_capacity(payload.len() + 2);
        if let Some(start) = self.start {
            out.put_u8(start);
        }
        out.put_slice(payload);
        out.put_u8(self.end);
        Ok(out.freeze())
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        let from = match self.start {
            Some(start) => match view.iter().position(|&b| b == start) {
                Some(pos) => pos,
                None => {
                    // no start marker anywhere: everything buffered is garbage
                    *view = &[];
                    return None;
                }
            },
            None => 0,
        };

        // with a start marker the end is searched after it, so flag-byte
        // framings do not close on their own opening byte
        let search_from = if self.start.is_some() { from + 1 } else { from };

        match view[search_from..].iter().position(|&b| b == self.end) {
            Some(rel) => {
                let end = search_from + rel;
                let frame = Bytes::copy_from_slice(&view[from..=end]);
                *view = &view[end + 1..];
                Some(frame)
            }
            None => {
                if view.len() - from > self.max_frame_size {
                    // end marker overdue: drop the view rather than let a
                    // broken stream grow the buffer without bound
                    *view = &[];
                }
                None
            }
        }
    }
}
