//! Transport contract consumed by the sniffer.
//!
//! The sniffer only ever needs the receive half of a duplex endpoint plus a
//! label for logging; anything that can fill a caller-supplied byte slice
//! asynchronously qualifies. [`IoTransport`] covers the common case of a
//! tokio `AsyncRead` (TCP streams, serial ports, test pipes).

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;

/// A byte-stream source with an identifiable remote endpoint.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Read available bytes into `buf`, suspending until at least one byte
    /// arrives. Returns the number of bytes read; zero means the remote
    /// closed the stream.
    async fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Human-readable label identifying the remote endpoint.
    fn remote_label(&self) -> &str;
}

/// Adapter turning any [`AsyncRead`] into a [`Transport`] with a label.
#[derive(Debug)]
pub struct IoTransport<T> {
    io: T,
    label: String,
}

impl<T: AsyncRead + Unpin + Send> IoTransport<T> {
    pub fn new(io: T, label: impl Into<String>) -> Self {
        Self {
            io,
            label: label.into(),
        }
    }

    /// Consume the adapter, returning the wrapped stream.
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl IoTransport<TcpStream> {
    /// Wrap a connected TCP stream, labelling it with the peer address.
    pub fn from_tcp(stream: TcpStream) -> io::Result<Self> {
        let label = stream.peer_addr()?.to_string();
        Ok(Self::new(stream, label))
    }
}

impl<T: AsyncRead + Unpin + Send> Transport for IoTransport<T> {
    async fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.io.read(buf).await
    }

    fn remote_label(&self) -> &str {
        &self.label
    }
}
