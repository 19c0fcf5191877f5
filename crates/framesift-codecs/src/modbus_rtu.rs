//! Modbus RTU frame codec with CRC validation and resynchronisation.
//!
//! Modbus RTU frames carry no explicit length; the total frame length is
//! implied by the function code (and for some functions by a byte count
//! inside the frame). On a noisy serial line the decoder therefore has to
//! *guess and verify*: at each candidate start offset it enumerates the
//! frame lengths the function code allows, and accepts the first candidate
//! whose trailing CRC-16/MODBUS checks out.
//!
//! # Wire format
//!
//! ```text
//! address(1)  function(1)  data(n)  CRC-low(1)  CRC-high(1)
//! ```
//!
//! The CRC is transmitted little-endian and covers every byte before it.
//!
//! # Resynchronisation
//!
//! The scan tries start offsets 0, 1, 2, … up to `scan_limit`. The decoder
//! never speculatively discards bytes at offset 0 while a plausible header
//! there is merely short on bytes — doing so would destroy a real frame in
//! transit. A byte is only skipped once it has been positively ruled out as
//! a frame start.
//!
//! Note that when a plausible-but-incomplete header sits at an offset
//! greater than zero, the scan keeps advancing past it; a valid frame whose
//! first byte also looks like a header at an earlier offset can be skipped
//! this way. This matches the established behaviour of the wire format's
//! deployed decoders and is kept for compatibility.

use crate::codec::FrameCodec;
use bytes::{BufMut, Bytes, BytesMut};
use framesift_core::constants::{
    MODBUS_BROADCAST_ADDRESS, MODBUS_CRC_INIT, MODBUS_CRC_POLY, MODBUS_MAX_ADDRESS,
    MODBUS_MAX_FRAME, MODBUS_SCAN_LIMIT,
};
use framesift_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`ModbusRtuCodec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusRtuConfig {
    /// Upper bound on the total frame length.
    pub max_frame_size: usize,

    /// How many start offsets the resync scan tries before giving up.
    pub scan_limit: usize,

    /// Verify the trailing CRC-16/MODBUS of every candidate.
    pub validate_crc: bool,

    /// Accept address 0 (broadcast) as a plausible frame start.
    pub allow_broadcast: bool,
}

impl Default for ModbusRtuConfig {
    fn default() -> Self {
        Self {
            max_frame_size: MODBUS_MAX_FRAME,
            scan_limit: MODBUS_SCAN_LIMIT,
            validate_crc: true,
            allow_broadcast: true,
        }
    }
}

/// Compute CRC-16/MODBUS over `data`.
///
/// Reflected polynomial 0xA001, initial value 0xFFFF.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = MODBUS_CRC_INIT;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ MODBUS_CRC_POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Upper bound on candidate lengths per anchor; no function code implies
/// more than two.
const MAX_LENGTH_CANDIDATES: usize = 4;

/// Candidate total frame lengths implied by the function code at `span[1]`.
///
/// Fills a fixed-size array rather than allocating; callers read
/// `candidates[..count]`. An unknown function code yields no candidates —
/// the decoder does not guess.
fn candidate_lengths(span: &[u8]) -> ([usize; MAX_LENGTH_CANDIDATES], usize) {
    let mut out = [0usize; MAX_LENGTH_CANDIDATES];
    let mut count = 0;

    let function = span[1];
    if function & 0x80 != 0 {
        // exception response: address, function, exception code, CRC
        out[0] = 5;
        return (out, 1);
    }

    match function {
        // read coils / discrete inputs / holding registers / input registers:
        // fixed-size request, or response sized by the byte count at span[2]
        1 | 2 | 3 | 4 => {
            out[count] = 8;
            count += 1;
            if span.len() >= 3 {
                out[count] = span[2] as usize + 5;
                count += 1;
            }
        }
        // write single coil / register: request and response echo, both fixed
        5 | 6 => {
            out[count] = 8;
            count += 1;
        }
        // write multiple coils / registers: fixed response echo, or request
        // sized by the byte count at span[6]
        15 | 16 => {
            out[count] = 8;
            count += 1;
            if span.len() >= 7 {
                out[count] = span[6] as usize + 9;
                count += 1;
            }
        }
        // mask write register
        22 => {
            out[count] = 10;
            count += 1;
        }
        // read/write multiple registers: response sized at span[2], request
        // sized at span[10]
        23 => {
            if span.len() >= 3 {
                out[count] = span[2] as usize + 5;
                count += 1;
            }
            if span.len() >= 11 {
                out[count] = span[10] as usize + 13;
                count += 1;
            }
        }
        _ => {}
    }

    (out, count)
}

/// Codec for Modbus RTU frames.
///
/// Decoded frames are complete wire frames including the CRC bytes, so a
/// captured frame can be re-emitted or archived verbatim.
///
/// # Example
///
/// ```
/// use framesift_codecs::{FrameCodec, ModbusRtuCodec};
///
/// let mut codec = ModbusRtuCodec::new();
/// let request = codec.encode(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]).unwrap();
/// assert_eq!(&request[..], &[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD]);
///
/// // two garbage bytes in front: the scanner realigns and drops them
/// let mut noisy = vec![0xFF, 0xFF];
/// noisy.extend_from_slice(&request);
/// let mut view: &[u8] = &noisy;
///
/// let frame = codec.decode(&mut view).unwrap();
/// assert_eq!(frame, request);
/// assert!(view.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ModbusRtuCodec {
    config: ModbusRtuConfig,
}

impl ModbusRtuCodec {
    /// Create a codec with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ModbusRtuConfig::default(),
        }
    }

    /// Create a codec with a custom configuration.
    pub fn with_config(config: ModbusRtuConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModbusRtuConfig {
        &self.config
    }

    fn plausible_address(&self, address: u8) -> bool {
        (address == MODBUS_BROADCAST_ADDRESS && self.config.allow_broadcast)
            || (1..=MODBUS_MAX_ADDRESS).contains(&address)
    }

    fn crc_matches(frame: &[u8]) -> bool {
        let split = frame.len() - 2;
        let expected = crc16(&frame[..split]);
        let stored = u16::from_le_bytes([frame[split], frame[split + 1]]);
        stored == expected
    }
}

impl Default for ModbusRtuCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec for ModbusRtuCodec {
    fn name(&self) -> &'static str {
        "modbus-rtu"
    }

    /// Append the CRC-16/MODBUS to `payload` (address + function + data).
    fn encode(&mut self, payload: &[u8]) -> Result<Bytes> {
        if payload.len() < 2 {
            return Err(Error::InvalidPayload(format!(
                "Modbus RTU payload needs at least address and function bytes, got {}",
                payload.len()
            )));
        }

        let crc = crc16(payload);
        let mut out = BytesMut::with_capacity(payload.len() + 2);
        out.put_slice(payload);
        out.put_u16_le(crc);
        Ok(out.freeze())
    }

    fn decode(&mut self, view: &mut &[u8]) -> Option<Bytes> {
        if view.len() < 4 {
            return None;
        }

        let last_anchor = self.config.scan_limit.min(view.len() - 3);
        for anchor in 0..=last_anchor {
            let span = &view[anchor..];
            if span.len() < 4 {
                break;
            }
            if !self.plausible_address(span[0]) {
                continue;
            }

            let (candidates, count) = candidate_lengths(span);
            let mut incomplete_possible = false;

            for &length in &candidates[..count] {
                if length == 0 || length > self.config.max_frame_size {
                    continue;
                }
                if span.len() < length {
                    incomplete_possible = true;
                    continue;
                }
                if self.config.validate_crc && !Self::crc_matches(&span[..length]) {
                    continue;
                }

                let frame = Bytes::copy_from_slice(&span[..length]);
                *view = &view[anchor + length..];
                return Some(frame);
            }

            // a plausible header anchored at the very front that is merely
            // short on bytes must not be dropped: wait for the rest
            if incomplete_possible && anchor == 0 {
                return None;
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a valid wire frame from address + function + data.
    fn wire_frame(payload: &[u8]) -> Vec<u8> {
        let crc = crc16(payload);
        let mut frame = payload.to_vec();
        frame.extend_from_slice(&crc.to_le_bytes());
        frame
    }

    #[test]
    fn test_crc16_known_vector() {
        assert_eq!(crc16(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]), 0xCDC5);
    }

    #[test]
    fn test_encode_appends_crc_little_endian() {
        let mut codec = ModbusRtuCodec::new();
        let encoded = codec.encode(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]).unwrap();
        assert_eq!(
            &encoded[..],
            &[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD]
        );
    }

    #[test]
    fn test_encode_rejects_short_payload() {
        let mut codec = ModbusRtuCodec::new();
        assert!(codec.encode(&[0x01]).is_err());
        assert!(codec.encode(&[]).is_err());
    }

    #[test]
    fn test_decode_clean_request() {
        let mut codec = ModbusRtuCodec::new();
        let frame = wire_frame(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]);
        let mut view: &[u8] = &frame;

        let decoded = codec.decode(&mut view).unwrap();
        assert_eq!(&decoded[..], &frame[..]);
        assert!(view.is_empty());
    }

    #[test]
    fn test_scenario_resync_over_garbage() {
        let mut codec = ModbusRtuCodec::new();
        let mut data = vec![0xFF, 0xFF];
        let frame = wire_frame(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]);
        data.extend_from_slice(&frame);
        let mut view: &[u8] = &data;

        let decoded = codec.decode(&mut view).unwrap();
        assert_eq!(&decoded[..], &frame[..]);
        assert!(view.is_empty());
    }

    #[test]
    fn test_decode_response_sized_by_byte_count() {
        // read holding registers response: 01 03 04 <4 data bytes> CRC
        let mut codec = ModbusRtuCodec::new();
        let frame = wire_frame(&[0x01, 0x03, 0x04, 0x11, 0x22, 0x33, 0x44]);
        let mut view: &[u8] = &frame;

        let decoded = codec.decode(&mut view).unwrap();
        assert_eq!(decoded.len(), 9);
        assert!(view.is_empty());
    }

    #[test]
    fn test_decode_exception_response() {
        let mut codec = ModbusRtuCodec::new();
        let frame = wire_frame(&[0x01, 0x83, 0x02]);
        let mut view: &[u8] = &frame;

        let decoded = codec.decode(&mut view).unwrap();
        assert_eq!(decoded.len(), 5);
    }

    #[test]
    fn test_decode_write_multiple_request() {
        // function 16 request: addr fn start(2) qty(2) bytecount data CRC
        let mut codec = ModbusRtuCodec::new();
        let frame = wire_frame(&[0x01, 0x10, 0x00, 0x00, 0x00, 0x02, 0x04, 0xAA, 0xBB, 0xCC, 0xDD]);
        let mut view: &[u8] = &frame;

        let decoded = codec.decode(&mut view).unwrap();
        assert_eq!(decoded.len(), 13);
    }

    #[test]
    fn test_incomplete_at_front_waits() {
        // a plausible request header with the tail missing: no advance
        let mut codec = ModbusRtuCodec::new();
        let frame = wire_frame(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]);
        let mut view: &[u8] = &frame[..6];

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view.len(), 6);
    }

    #[test]
    fn test_bad_crc_is_not_decoded() {
        let mut codec = ModbusRtuCodec::new();
        let mut frame = wire_frame(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]);
        let tampered = frame.len() - 1;
        frame[tampered] ^= 0xFF;
        let mut view: &[u8] = &frame;

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view.len(), frame.len());
    }

    #[test]
    fn test_crc_validation_can_be_disabled() {
        let mut codec = ModbusRtuCodec::with_config(ModbusRtuConfig {
            validate_crc: false,
            ..ModbusRtuConfig::default()
        });
        let mut frame = wire_frame(&[0x01, 0x05, 0x00, 0x01, 0xFF, 0x00]);
        let tampered = frame.len() - 1;
        frame[tampered] ^= 0xFF;
        let mut view: &[u8] = &frame;

        assert!(codec.decode(&mut view).is_some());
    }

    #[test]
    fn test_broadcast_address_respects_config() {
        let payload = [0x00, 0x06, 0x00, 0x01, 0x00, 0x2A];
        let frame = wire_frame(&payload);

        let mut accepting = ModbusRtuCodec::new();
        let mut view: &[u8] = &frame;
        assert!(accepting.decode(&mut view).is_some());

        let mut rejecting = ModbusRtuCodec::with_config(ModbusRtuConfig {
            allow_broadcast: false,
            ..ModbusRtuConfig::default()
        });
        let mut view: &[u8] = &frame;
        assert!(rejecting.decode(&mut view).is_none());
        assert_eq!(view.len(), frame.len());
    }

    #[test]
    fn test_address_above_unicast_range_skipped() {
        // 0xF8 = 248 is outside 1..=247 and never a frame start
        let mut codec = ModbusRtuCodec::new();
        let mut data = vec![0xF8];
        data.extend_from_slice(&wire_frame(&[0x02, 0x06, 0x00, 0x01, 0x00, 0x2A]));
        let mut view: &[u8] = &data;

        let decoded = codec.decode(&mut view).unwrap();
        assert_eq!(decoded[0], 0x02);
        assert!(view.is_empty());
    }

    #[test]
    fn test_unknown_function_code_no_guess() {
        let mut codec = ModbusRtuCodec::new();
        // function 0x55 has no length rule; nothing is decoded and the
        // scan finds no later anchor either
        let mut view: &[u8] = &[0x01, 0x55, 0x00, 0x00, 0x00, 0x00];

        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view.len(), 6);
    }

    #[test]
    fn test_two_frames_back_to_back() {
        let mut codec = ModbusRtuCodec::new();
        let first = wire_frame(&[0x01, 0x06, 0x00, 0x01, 0x00, 0x2A]);
        let second = wire_frame(&[0x02, 0x83, 0x04]);
        let mut data = first.clone();
        data.extend_from_slice(&second);
        let mut view: &[u8] = &data;

        assert_eq!(&codec.decode(&mut view).unwrap()[..], &first[..]);
        assert_eq!(&codec.decode(&mut view).unwrap()[..], &second[..]);
        assert!(view.is_empty());
    }

    #[test]
    fn test_scan_limit_bounds_the_search() {
        let mut codec = ModbusRtuCodec::with_config(ModbusRtuConfig {
            scan_limit: 2,
            ..ModbusRtuConfig::default()
        });
        let mut data = vec![0xF8, 0xF8, 0xF8, 0xF8];
        data.extend_from_slice(&wire_frame(&[0x01, 0x06, 0x00, 0x01, 0x00, 0x2A]));
        let mut view: &[u8] = &data;

        // the frame starts at offset 4, past the scan limit
        assert!(codec.decode(&mut view).is_none());
        assert_eq!(view.len(), data.len());
    }

    #[test]
    fn test_roundtrip_frame_includes_crc() {
        let mut codec = ModbusRtuCodec::new();
        let payload = [0x11, 0x04, 0x00, 0x08, 0x00, 0x01];
        let encoded = codec.encode(&payload).unwrap();

        let mut view: &[u8] = &encoded;
        let decoded = codec.decode(&mut view).unwrap();
        assert_eq!(decoded, encoded);
        assert_eq!(&decoded[..payload.len()], &payload[..]);
    }
}
