//! Command definitions
//!
//! Represents requests sent to the server.

use std::fmt;
use std::time::Duration;

use crate::filter::Query;
use crate::value::Value;

/// Keys must be strictly shorter than this many bytes
pub const MAX_KEY_LEN: usize = 65536;

/// A delete-many request must carry strictly fewer keys than this
pub const MAX_KEYS: usize = 65536;

/// Two-character request type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Set,
    IncrInt,
    IncrFloat,
    GetTable,
    Get,
    Delete,
    DeleteMany,
    Touch,
    Ttl,
    Keys,
}

impl MessageType {
    /// The two ASCII bytes written after the protocol marker
    pub const fn code(self) -> [u8; 2] {
        match self {
            MessageType::Set => *b"SD",
            MessageType::IncrInt => *b"II",
            MessageType::IncrFloat => *b"IF",
            MessageType::GetTable => *b"GA",
            MessageType::Get => *b"GD",
            MessageType::Delete => *b"DL",
            MessageType::DeleteMany => *b"DM",
            MessageType::Touch => *b"TH",
            MessageType::Ttl => *b"TL",
            MessageType::Keys => *b"LS",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Set => "SD",
            MessageType::IncrInt => "II",
            MessageType::IncrFloat => "IF",
            MessageType::GetTable => "GA",
            MessageType::Get => "GD",
            MessageType::Delete => "DL",
            MessageType::DeleteMany => "DM",
            MessageType::Touch => "TH",
            MessageType::Ttl => "TL",
            MessageType::Keys => "LS",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the server
#[derive(Debug, Clone)]
pub enum Command {
    /// Store a value; a zero TTL means no expiry
    Set {
        key: String,
        value: Value,
        ttl: Duration,
    },

    /// Add to an integer value, creating it if missing
    IncrInt { key: String, delta: i64 },

    /// Add to a float value, creating it if missing
    IncrFloat { key: String, delta: f64 },

    /// Fetch a table value with projection and row filters
    GetTable(Query),

    /// Fetch any value
    Get { key: String },

    /// Remove a key
    Delete { key: String },

    /// Remove several keys at once
    DeleteMany { keys: Vec<String> },

    /// Reset the TTL of an existing key
    Touch { key: String, ttl: Duration },

    /// Read the remaining TTL of a key
    Ttl { key: String },

    /// List live keys, optionally filtered by a glob pattern
    Keys { pattern: Option<String> },
}

impl Command {
    /// Get the message type
    pub fn message_type(&self) -> MessageType {
        match self {
            Command::Set { .. } => MessageType::Set,
            Command::IncrInt { .. } => MessageType::IncrInt,
            Command::IncrFloat { .. } => MessageType::IncrFloat,
            Command::GetTable(_) => MessageType::GetTable,
            Command::Get { .. } => MessageType::Get,
            Command::Delete { .. } => MessageType::Delete,
            Command::DeleteMany { .. } => MessageType::DeleteMany,
            Command::Touch { .. } => MessageType::Touch,
            Command::Ttl { .. } => MessageType::Ttl,
            Command::Keys { .. } => MessageType::Keys,
        }
    }
}
