//! The 7-byte message header (spec.md §4.2/§6).
//!
//! Hand-written big-endian field writes rather than a derive/serializer
//! crate, per spec.md §9's explicit redesign note: "use explicit
//! serialization with field-by-field big-endian writes; do not rely on
//! struct memory layout for network compatibility." This mirrors the
//! teacher's `network/codec.rs` in spirit (a small, centralized, tested
//! encode/decode module) but not in mechanism (no `bincode`).

use crate::error::NetcodeError;

/// Wire size of the header, in bytes.
pub const HEADER_LEN: usize = 7;

/// `{ type: u8, frame: u32 BE, payload_size: u16 BE }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub tag: u8,
    pub frame: u32,
    pub payload_size: u16,
}

impl MessageHeader {
    #[must_use]
    pub fn new(tag: u8, frame: u32, payload_size: u16) -> Self {
        Self {
            tag,
            frame,
            payload_size,
        }
    }

    /// Writes the header's 7 bytes, big-endian, to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.tag);
        out.extend_from_slice(&self.frame.to_be_bytes());
        out.extend_from_slice(&self.payload_size.to_be_bytes());
    }

    /// Reads a header from the first [`HEADER_LEN`] bytes of `bytes`.
    ///
    /// # Errors
    /// Returns [`NetcodeError::ProtocolViolation`] if fewer than
    /// [`HEADER_LEN`] bytes are available.
    pub fn decode(bytes: &[u8]) -> Result<Self, NetcodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(NetcodeError::ProtocolViolation {
                reason: format!("short header: {} < {HEADER_LEN} bytes", bytes.len()),
            });
        }
        let tag = bytes[0];
        let frame = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let payload_size = u16::from_be_bytes([bytes[5], bytes[6]]);
        Ok(Self {
            tag,
            frame,
            payload_size,
        })
    }
}
