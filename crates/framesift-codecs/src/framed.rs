//! Tokio codec adapter for framesift codecs.
//!
//! [`FramedCodec`] bridges any [`FrameCodec`] to Tokio's
//! [`Decoder`]/[`Encoder`] traits so it can drive a
//! [`Framed`](tokio_util::codec::Framed) stream over TCP, serial ports, or
//! any other `AsyncRead + AsyncWrite` transport.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use futures::{SinkExt, StreamExt};
//! use framesift_codecs::{FramedCodec, NewlineCodec};
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//!
//! # async fn example() -> framesift_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:4000").await?;
//! let mut framed = Framed::new(stream, FramedCodec::new(NewlineCodec::new()));
//!
//! framed.send(Bytes::from_static(b"ping")).await?;
//! if let Some(Ok(frame)) = framed.next().await {
//!     println!("received {} bytes", frame.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # DoS protection
//!
//! Independent of whatever bounds the wrapped codec enforces, the adapter
//! rejects any single frame larger than its configured limit with
//! [`Error::FrameTooLarge`], on both the decode and the encode path.

use crate::codec::FrameCodec;
use bytes::{Buf, Bytes, BytesMut};
use framesift_core::constants::DEFAULT_MAX_FRAME_SIZE;
use framesift_core::{Error, Result};
use tokio_util::codec::{Decoder, Encoder};

/// Adapter implementing Tokio's codec traits over a [`FrameCodec`].
#[derive(Debug)]
pub struct FramedCodec<C> {
    inner: C,
    max_frame_size: usize,
}

impl<C: FrameCodec> FramedCodec<C> {
    /// Wrap `inner` with the default maximum frame size.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Wrap `inner` with a custom maximum frame size.
    pub fn with_max_frame_size(inner: C, max_frame_size: usize) -> Self {
        Self {
            inner,
            max_frame_size,
        }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Access the wrapped codec, e.g. to read an
    /// [`AutoFrameCodec`](crate::AutoFrameCodec) mode tag.
    pub fn codec(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: FrameCodec> Decoder for FramedCodec<C> {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        let mut view: &[u8] = &src[..];
        let decoded = self.inner.decode(&mut view);

        // the codec consumed bytes by shrinking its view; mirror that on the
        // real buffer whether or not a frame came out (resync steps consume
        // garbage without producing a frame)
        let consumed = src.len() - view.len();
        src.advance(consumed);

        match decoded {
            Some(frame) if frame.len() > self.max_frame_size => Err(Error::FrameTooLarge {
                size: frame.len(),
                max_size: self.max_frame_size,
            }),
            Some(frame) => Ok(Some(frame)),
            None => Ok(None),
        }
    }
}

impl<C: FrameCodec> Encoder<Bytes> for FramedCodec<C> {
    type Error = Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        let encoded = self.inner.encode(&item)?;

        if encoded.len() > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size: encoded.len(),
                max_size: self.max_frame_size,
            });
        }

        dst.extend_from_slice(&encoded);
        Ok(())
    }
}
