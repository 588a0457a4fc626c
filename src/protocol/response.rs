//! Response definitions
//!
//! Represents responses received from the server.

use std::fmt;

use bytes::Bytes;

/// Two-character response type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseTag {
    /// Unconditional success
    Ok,
    /// Domain error, payload is a 2-byte error code
    Error,
    /// 8-byte signed integer
    Integer,
    /// 8-byte IEEE754 double
    Float,
    /// Opaque serialized blob
    Blob,
    /// Arrow table stream
    Table,
    /// 2-byte count of deleted keys
    DeletedCount,
    /// Keys separated by 0x00
    Keys,
    /// 8-byte TTL in milliseconds
    Ttl,
}

impl ResponseTag {
    /// Parse a tag from its two ASCII bytes
    pub fn from_bytes(tag: [u8; 2]) -> Option<Self> {
        match &tag {
            b"OK" => Some(ResponseTag::Ok),
            b"ER" => Some(ResponseTag::Error),
            b"IN" => Some(ResponseTag::Integer),
            b"FL" => Some(ResponseTag::Float),
            b"BY" => Some(ResponseTag::Blob),
            b"AR" => Some(ResponseTag::Table),
            b"DM" => Some(ResponseTag::DeletedCount),
            b"KY" => Some(ResponseTag::Keys),
            b"TL" => Some(ResponseTag::Ttl),
            _ => None,
        }
    }

    pub const fn code(self) -> [u8; 2] {
        match self {
            ResponseTag::Ok => *b"OK",
            ResponseTag::Error => *b"ER",
            ResponseTag::Integer => *b"IN",
            ResponseTag::Float => *b"FL",
            ResponseTag::Blob => *b"BY",
            ResponseTag::Table => *b"AR",
            ResponseTag::DeletedCount => *b"DM",
            ResponseTag::Keys => *b"KY",
            ResponseTag::Ttl => *b"TL",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseTag::Ok => "OK",
            ResponseTag::Error => "ER",
            ResponseTag::Integer => "IN",
            ResponseTag::Float => "FL",
            ResponseTag::Blob => "BY",
            ResponseTag::Table => "AR",
            ResponseTag::DeletedCount => "DM",
            ResponseTag::Keys => "KY",
            ResponseTag::Ttl => "TL",
        }
    }
}

impl fmt::Display for ResponseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes carried by `ER` responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SetFailed,
    NotFound,
    InvalidQuery,
    InvalidTableData,
    InvalidDataType,
    Unknown(u16),
}

impl ErrorCode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            1 => ErrorCode::SetFailed,
            2 => ErrorCode::NotFound,
            3 => ErrorCode::InvalidQuery,
            4 => ErrorCode::InvalidTableData,
            5 => ErrorCode::InvalidDataType,
            other => ErrorCode::Unknown(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            ErrorCode::SetFailed => 1,
            ErrorCode::NotFound => 2,
            ErrorCode::InvalidQuery => 3,
            ErrorCode::InvalidTableData => 4,
            ErrorCode::InvalidDataType => 5,
            ErrorCode::Unknown(code) => code,
        }
    }
}

/// A complete response read from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Raw two-byte tag as received
    pub tag: [u8; 2],

    /// Payload bytes, exactly as long as the header announced
    pub payload: Bytes,
}

impl Response {
    pub fn new(tag: [u8; 2], payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// Create an `ER` response carrying the given code
    pub fn error(code: ErrorCode) -> Self {
        Self::new(ResponseTag::Error.code(), code.as_u16().to_be_bytes().to_vec())
    }

    /// Parsed tag, if it belongs to the known vocabulary
    pub fn response_tag(&self) -> Option<ResponseTag> {
        ResponseTag::from_bytes(self.tag)
    }

    /// Tag as text, for diagnostics
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }
}
