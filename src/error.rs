//! Error types for CupidDB
//!
//! Provides a unified error type for all client operations.

use thiserror::Error;

use crate::protocol::{ErrorCode, MessageType};

/// Result type alias using CupidError
pub type Result<T> = std::result::Result<T, CupidError>;

/// Unified error type for CupidDB client operations
#[derive(Debug, Error)]
pub enum CupidError {
    // -------------------------------------------------------------------------
    // I/O and Connection Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The response header did not start with the protocol marker.
    /// The byte stream is out of sync and the connection is unusable.
    #[error("Wrong protocol: expected marker 0x{expected:02x}, got 0x{actual:02x}")]
    WrongProtocol { expected: u8, actual: u8 },

    #[error("Connection is no longer usable after a previous failure")]
    ConnectionBroken,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Response Shape Errors
    // -------------------------------------------------------------------------
    #[error("Unexpected response type {tag:?} for {command} request")]
    UnexpectedResponse { command: MessageType, tag: String },

    #[error("Malformed {tag} payload: expected {expected} bytes, got {actual}")]
    MalformedPayload {
        tag: &'static str,
        expected: usize,
        actual: usize,
    },

    // -------------------------------------------------------------------------
    // Local Precondition Errors
    // -------------------------------------------------------------------------
    #[error("Key too long: {len} bytes (max {max})")]
    KeyTooLong { len: usize, max: usize },

    #[error("Too many keys: {count} (max {max})")]
    TooManyKeys { count: usize, max: usize },

    #[error("Invalid row filter: {0}")]
    InvalidFilter(String),

    // -------------------------------------------------------------------------
    // Server Error Codes
    // -------------------------------------------------------------------------
    #[error("Set failed")]
    SetFailed,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Invalid query")]
    InvalidQuery,

    #[error("Invalid table data")]
    InvalidTableData,

    #[error("Invalid data type for this operation")]
    InvalidDataType,

    #[error("Server error code {0}")]
    Server(u16),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    /// A blob payload could not be decoded on the client side.
    #[error("Invalid blob data: {0}")]
    InvalidBlobData(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Table error: {0}")]
    Table(#[from] arrow::error::ArrowError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CupidError {
    /// Whether this error leaves the connection unusable.
    ///
    /// Fatal errors happen mid-exchange (socket failure, marker mismatch,
    /// bad framing); domain errors arrive in a complete response and leave
    /// the stream in sync.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CupidError::Io(_)
                | CupidError::WrongProtocol { .. }
                | CupidError::ConnectionBroken
                | CupidError::ConnectionClosed
                | CupidError::Protocol(_)
        )
    }
}

impl From<ErrorCode> for CupidError {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::SetFailed => CupidError::SetFailed,
            ErrorCode::NotFound => CupidError::KeyNotFound,
            ErrorCode::InvalidQuery => CupidError::InvalidQuery,
            ErrorCode::InvalidTableData => CupidError::InvalidTableData,
            ErrorCode::InvalidDataType => CupidError::InvalidDataType,
            ErrorCode::Unknown(code) => CupidError::Server(code),
        }
    }
}

impl From<serde_json::Error> for CupidError {
    fn from(e: serde_json::Error) -> Self {
        CupidError::Serialization(e.to_string())
    }
}
