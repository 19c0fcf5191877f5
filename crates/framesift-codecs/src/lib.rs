pub mod auto;
pub mod codec;
pub mod delimited;
pub mod fixed;
pub mod framed;
pub mod length_field;
pub mod length_prefixed;
pub mod modbus_rtu;
pub mod newline;
pub mod packet;
pub mod stx_etx;

pub use auto::{AutoFrameCodec, AutoFrameConfig};
pub use codec::FrameCodec;
pub use delimited::DelimitedCodec;
pub use fixed::FixedLengthCodec;
pub use framed::FramedCodec;
pub use length_field::{LengthFieldCodec, LengthFieldConfig};
pub use length_prefixed::LengthPrefixedCodec;
pub use modbus_rtu::{ModbusRtuCodec, ModbusRtuConfig, crc16};
pub use newline::NewlineCodec;
pub use packet::{Packet, PacketCodec};
pub use stx_etx::StxEtxCodec;
