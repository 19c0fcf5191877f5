//! Message-boundary packet codec with a fixed 12-byte header.
//!
//! Unlike the streaming codecs in this crate, the packet codec assumes the
//! caller already owns message boundaries (a datagram, a record pulled from
//! a queue) and only validates and strips the header. Decoding rejects any
//! input whose total length is not exactly header plus declared payload.

use crate::codec::FrameCodec;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use framesift_core::constants::PACKET_HEADER_SIZE;
use framesift_core::{Error, Result};

/// A parsed packet: 12-byte big-endian header plus owned payload.
///
/// Header layout: version(1), kind(1), flags(2), sequence(4),
/// payload-length(4, signed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub version: u8,
    pub kind: u8,
    pub flags: u16,
    pub sequence: u32,
    pub payload: Bytes,
}

impl Packet {
    /// Parse a complete packet from `input`.
    ///
    /// Returns `None` when the input is shorter than a header, declares a
    /// negative payload length, or is not exactly header + payload long.
    /// The payload is copied out so the packet outlives the input buffer.
    pub fn parse(input: &[u8]) -> Option<Packet> {
        if input.len() < PACKET_HEADER_SIZE {
            return None;
        }

        let mut header = input;
        let version = header.get_u8();
        let kind = header.get_u8();
        let flags = header.get_u16();
        let sequence = header.get_u32();
        let payload_length = header.get_i32();

        if payload_length < 0 {
            return None;
        }
        if input.len() != PACKET_HEADER_SIZE + payload_length as usize {
            return None;
        }

        Some(Packet {
            version,
            kind,
            flags,
            sequence,
            payload: Bytes::copy_from_slice(&input[PACKET_HEADER_SIZE..]),
        })
    }

    /// Serialise the packet to its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayload`] when the payload does not fit the
    /// signed 32-bit length field.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let payload_length = i32::try_from(self.payload.len()).map_err(|_| {
            Error::InvalidPayload(format!(
                "payload of {} bytes does not fit a signed 32-bit length field",
                self.payload.len()
            ))
        })?;

        let mut out = BytesMut::with_capacity(PACKET_HEADER_SIZE + self.payload.len());
        out.put_u8(self.version);
        out.put_u8(self.kind);
        out.put_u16(self.flags);
        out.put_u32(self.sequence);
        out.put_i32(payload_length);
        out.put_slice(&self.payload);
        Ok(out.freeze())
    }
}

/// [`FrameCodec`] adapter for [`Packet`].
///
/// Encoding stamps the codec's configured version, kind and flags and a
/// sequence number that increments per encoded packet. Decoding returns the
/// payload alone; callers that need header fields use [`Packet::parse`]
/// directly.
#[derive(Debug, Clone)]
pub struct PacketCodec {
    version: u8,
    kind: u8,
    flags: u16,
    next_sequence: u32,
}

impl PacketCodec {
    pub fn new(version: u8, kind: u8, flags: u16) -> Self {
        Self {
            version,
            kind,
            flags,
            next_sequence: 0,
        }
    }

    /// Sequence number the next encoded packet will carry.
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl FrameCodec for PacketCodec {
    fn name(&self) -> &'static str {
        "packet"
    }

    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        let packet = Packet {
            version: self.version,
            kind: self.kind,
            flags: self.flags,
            sequence: self.next_sequence,
            payload: Bytes::copy_from_slice(payload),
        };
        let bytes = packet.to_bytes()?;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        Ok(bytes)
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        let packet = Packet::parse(view)?;
        *view = &[];
        Some(packet.payload)
    }
}
