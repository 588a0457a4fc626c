//! Protocol Module
//!
//! Defines the wire protocol between client and server.
//!
//! ## Protocol Format
//!
//! ### Request Format
//! ```text
//! ┌────────────┬──────────┬──────────────┬─────────────────────┐
//! │ Marker (1) │ Type (2) │ Length (8)   │       Payload       │
//! │    'A'     │  ASCII   │ BE unsigned  │                     │
//! └────────────┴──────────┴──────────────┴─────────────────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌────────────┬──────────┬──────────────┬─────────────────────┐
//! │ Marker (1) │ Tag (2)  │ Length (8)   │       Payload       │
//! └────────────┴──────────┴──────────────┴─────────────────────┘
//! ```
//!
//! ### Message Types
//! - SD: set value      - ttl (8) + key_len (2) + key + data_type (1) + value
//! - II: incr integer   - delta (8, i64) + key
//! - IF: incr float     - delta (8, f64) + key
//! - GA: get table      - JSON query text
//! - GD: get value      - key
//! - DL: delete         - key
//! - DM: delete many    - keys joined by 0x00
//! - TH: touch          - ttl (8) + key
//! - TL: get ttl        - key
//! - LS: list keys      - glob pattern (empty = all keys)
//!
//! ### Response Tags
//! - OK, ER (2-byte error code), IN, FL, BY, AR, DM, KY, TL

mod command;
mod response;
mod frame;
mod codec;

pub use command::{Command, MessageType, MAX_KEY_LEN, MAX_KEYS};
pub use response::{ErrorCode, Response, ResponseTag};
pub use frame::{
    encode_request, RequestHeader, ResponseHeader, PROTOCOL_MARKER, REQUEST_HEADER_SIZE,
    RESPONSE_HEADER_SIZE,
};
pub use codec::{
    check_key, decode_deleted_count, decode_exists, decode_float, decode_int, decode_keys,
    decode_set, decode_table, decode_ttl, decode_value, encode_command,
};
