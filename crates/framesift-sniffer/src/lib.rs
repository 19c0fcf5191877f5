//! Streaming sniffer layer for framesift
//!
//! This crate drives the framesift codecs against a live byte stream: it
//! pulls bytes from a transport into a bounded receive buffer, races a set
//! of codecs over the buffered prefix, and hands every decoded frame to a
//! dumper. It is the observability end of the workspace — point it at a
//! serial tap or a TCP socket carrying an unknown framing discipline and it
//! renders the traffic as discrete frames.
//!
//! # Components
//!
//! - **Transport**: contract for anything with an async receive and a
//!   remote label; [`IoTransport`] adapts any `AsyncRead`
//! - **FrameDumper**: contract for the frame sink; [`HexDumper`] renders
//!   canonical hex rows through `tracing`
//! - **AutoFrameSniffer**: the receive/decode/dump/compact loop
//!
//! # Example
//!
//! ```no_run
//! use framesift_sniffer::{AutoFrameSniffer, HexDumper, IoTransport};
//! use tokio::net::TcpStream;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("192.168.0.50:9600").await?;
//! let transport = IoTransport::from_tcp(stream)?;
//!
//! let sniffer = AutoFrameSniffer::new(transport, HexDumper::new(), CancellationToken::new());
//! sniffer.run().await?;
//! # Ok(())
//! # }
//! ```

mod dumper;
mod sniffer;
mod transport;

pub use dumper::{FrameDumper, HexDumper, RX_TAG, hex_lines};
pub use sniffer::{AutoFrameSniffer, SnifferError, default_codecs};
pub use transport::{IoTransport, Transport};
