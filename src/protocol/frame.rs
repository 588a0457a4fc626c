//! Frame headers
//!
//! Fixed-size request and response headers with pure encode/decode.
//!
//! ```text
//! ┌────────────┬──────────┬──────────────────────────┐
//! │ Marker (1) │ Type (2) │ Payload length (8, BE)   │
//! └────────────┴──────────┴──────────────────────────┘
//! ```

use bytes::{Buf, BufMut, BytesMut};

use super::MessageType;
use crate::error::{CupidError, Result};

/// Leading byte of every request and response
pub const PROTOCOL_MARKER: u8 = b'A';

/// Request header size: marker (1) + type (2) + length (8)
pub const REQUEST_HEADER_SIZE: usize = 11;

/// Response header size: marker (1) + tag (2) + length (8)
pub const RESPONSE_HEADER_SIZE: usize = 11;

// =============================================================================
// Request Header
// =============================================================================

/// Header written in front of every request payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub message_type: MessageType,
    pub payload_len: u64,
}

impl RequestHeader {
    pub fn new(message_type: MessageType, payload_len: usize) -> Self {
        Self {
            message_type,
            payload_len: payload_len as u64,
        }
    }

    pub fn encode(&self) -> [u8; REQUEST_HEADER_SIZE] {
        let mut out = [0u8; REQUEST_HEADER_SIZE];
        out[0] = PROTOCOL_MARKER;
        out[1..3].copy_from_slice(&self.message_type.code());
        out[3..11].copy_from_slice(&self.payload_len.to_be_bytes());
        out
    }
}

/// Encode a full request frame: header followed by payload
pub fn encode_request(message_type: MessageType, payload: &[u8]) -> BytesMut {
    let header = RequestHeader::new(message_type, payload.len());
    let mut buf = BytesMut::with_capacity(REQUEST_HEADER_SIZE + payload.len());
    buf.put_slice(&header.encode());
    buf.put_slice(payload);
    buf
}

// =============================================================================
// Response Header
// =============================================================================

/// Header read in front of every response payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub tag: [u8; 2],
    pub payload_len: u64,
}

impl ResponseHeader {
    /// Decode an 11-byte response header
    ///
    /// Fails with `WrongProtocol` when the marker byte is wrong, which means
    /// the stream is desynchronized.
    pub fn decode(bytes: &[u8; RESPONSE_HEADER_SIZE]) -> Result<Self> {
        let mut buf = &bytes[..];
        let marker = buf.get_u8();
        if marker != PROTOCOL_MARKER {
            return Err(CupidError::WrongProtocol {
                expected: PROTOCOL_MARKER,
                actual: marker,
            });
        }

        let tag = [buf.get_u8(), buf.get_u8()];
        let payload_len = buf.get_u64();

        Ok(Self { tag, payload_len })
    }

    pub fn encode(&self) -> [u8; RESPONSE_HEADER_SIZE] {
        let mut out = [0u8; RESPONSE_HEADER_SIZE];
        out[0] = PROTOCOL_MARKER;
        out[1..3].copy_from_slice(&self.tag);
        out[3..11].copy_from_slice(&self.payload_len.to_be_bytes());
        out
    }

    /// Payload length as a `usize`, rejecting lengths this platform cannot hold
    pub fn payload_len_usize(&self) -> Result<usize> {
        usize::try_from(self.payload_len).map_err(|_| {
            CupidError::Protocol(format!(
                "Response payload length {} does not fit in memory",
                self.payload_len
            ))
        })
    }
}
