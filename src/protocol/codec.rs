//! Protocol codec
//!
//! Builds request payloads for each command and turns responses back into
//! typed results.
//!
//! ### Payload by Command Type
//! - SD: ttl_ms (8) + key_len (2) + key + data_type (1) + value
//! - II: delta (8, signed) + key
//! - IF: delta (8, double) + key
//! - GA: JSON query text
//! - GD / DL / TL: key
//! - DM: key 0x00 key 0x00 ... key
//! - TH: ttl_ms (8) + key
//! - LS: glob pattern, empty for all keys
//!
//! ### Table Response (AR from GA)
//! ```text
//! ┌───────────────┬──────────────────────┬──────────────────┐
//! │ MetaLen (4)   │ Metadata (JSON map)  │  Arrow stream    │
//! └───────────────┴──────────────────────┴──────────────────┘
//! ```

use std::time::Duration;

use arrow::record_batch::RecordBatch;
use bytes::{Buf, BufMut};

use super::{Command, ErrorCode, MessageType, Response, ResponseTag, MAX_KEYS, MAX_KEY_LEN};
use crate::error::{CupidError, Result};
use crate::table::{self, TableMetadata};
use crate::value::Value;

/// Separator between keys in DM requests and KY responses
const KEY_SEPARATOR: u8 = 0x00;

// =============================================================================
// Command Encoding
// =============================================================================

/// Reject keys that cannot be sent
pub fn check_key(key: &str) -> Result<()> {
    if key.len() >= MAX_KEY_LEN {
        return Err(CupidError::KeyTooLong {
            len: key.len(),
            max: MAX_KEY_LEN - 1,
        });
    }
    Ok(())
}

fn ttl_millis(ttl: Duration) -> u64 {
    ttl.as_millis() as u64
}

/// Encode the payload of a command
///
/// Framing is added by the transport.
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let payload = match command {
        Command::Set { key, value, ttl } => {
            check_key(key)?;
            let data = value.to_wire()?;
            let mut payload = Vec::with_capacity(8 + 2 + key.len() + 1 + data.len());
            payload.put_u64(ttl_millis(*ttl));
            payload.put_u16(key.len() as u16);
            payload.put_slice(key.as_bytes());
            payload.put_u8(value.data_type().as_byte());
            payload.put_slice(&data);
            payload
        }
        Command::IncrInt { key, delta } => {
            check_key(key)?;
            let mut payload = Vec::with_capacity(8 + key.len());
            payload.put_i64(*delta);
            payload.put_slice(key.as_bytes());
            payload
        }
        Command::IncrFloat { key, delta } => {
            check_key(key)?;
            let mut payload = Vec::with_capacity(8 + key.len());
            payload.put_f64(*delta);
            payload.put_slice(key.as_bytes());
            payload
        }
        Command::GetTable(query) => {
            check_key(query.key())?;
            query.to_json()?
        }
        Command::Get { key } | Command::Delete { key } | Command::Ttl { key } => {
            check_key(key)?;
            key.as_bytes().to_vec()
        }
        Command::DeleteMany { keys } => {
            if keys.len() >= MAX_KEYS {
                return Err(CupidError::TooManyKeys {
                    count: keys.len(),
                    max: MAX_KEYS - 1,
                });
            }
            let mut payload = Vec::new();
            for (i, key) in keys.iter().enumerate() {
                check_key(key)?;
                if i > 0 {
                    payload.put_u8(KEY_SEPARATOR);
                }
                payload.put_slice(key.as_bytes());
            }
            payload
        }
        Command::Touch { key, ttl } => {
            check_key(key)?;
            let mut payload = Vec::with_capacity(8 + key.len());
            payload.put_u64(ttl_millis(*ttl));
            payload.put_slice(key.as_bytes());
            payload
        }
        Command::Keys { pattern } => pattern
            .as_deref()
            .map(|p| p.as_bytes().to_vec())
            .unwrap_or_default(),
    };

    Ok(payload)
}

// =============================================================================
// Response Decoding Helpers
// =============================================================================

fn unexpected(command: MessageType, response: &Response) -> CupidError {
    CupidError::UnexpectedResponse {
        command,
        tag: response.tag_str(),
    }
}

fn expect_len(tag: &'static str, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() != expected {
        return Err(CupidError::MalformedPayload {
            tag,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

fn error_code(response: &Response) -> Result<ErrorCode> {
    expect_len("ER", &response.payload, 2)?;
    Ok(ErrorCode::from_u16((&response.payload[..]).get_u16()))
}

/// Map an `ER` response to its error, or any other tag to `UnexpectedResponse`
fn failure(command: MessageType, response: &Response) -> CupidError {
    match response.response_tag() {
        Some(ResponseTag::Error) => match error_code(response) {
            Ok(code) => code.into(),
            Err(e) => e,
        },
        _ => unexpected(command, response),
    }
}

/// `ER` with code 2 becomes `None`; everything else is a failure
fn not_found_or_failure<T>(command: MessageType, response: &Response) -> Result<Option<T>> {
    if response.response_tag() == Some(ResponseTag::Error)
        && error_code(response)? == ErrorCode::NotFound
    {
        return Ok(None);
    }
    Err(failure(command, response))
}

fn read_i64(payload: &[u8]) -> Result<i64> {
    expect_len("IN", payload, 8)?;
    Ok((&payload[..]).get_i64())
}

fn read_f64(payload: &[u8]) -> Result<f64> {
    expect_len("FL", payload, 8)?;
    Ok((&payload[..]).get_f64())
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decode the response to a set request
pub fn decode_set(response: &Response) -> Result<bool> {
    match response.response_tag() {
        Some(ResponseTag::Ok) => Ok(true),
        _ => Err(failure(MessageType::Set, response)),
    }
}

/// Decode the response to an integer increment
pub fn decode_int(response: &Response) -> Result<i64> {
    match response.response_tag() {
        Some(ResponseTag::Integer) => read_i64(&response.payload),
        _ => Err(failure(MessageType::IncrInt, response)),
    }
}

/// Decode the response to a float increment
pub fn decode_float(response: &Response) -> Result<f64> {
    match response.response_tag() {
        Some(ResponseTag::Float) => read_f64(&response.payload),
        _ => Err(failure(MessageType::IncrFloat, response)),
    }
}

/// Decode an `OK`-or-missing response (delete, touch)
pub fn decode_exists(command: MessageType, response: &Response) -> Result<bool> {
    match response.response_tag() {
        Some(ResponseTag::Ok) => Ok(true),
        _ => not_found_or_failure::<()>(command, response).map(|_| false),
    }
}

/// Decode the number of keys removed by a delete-many request
pub fn decode_deleted_count(response: &Response) -> Result<u16> {
    match response.response_tag() {
        Some(ResponseTag::DeletedCount) => {
            expect_len("DM", &response.payload, 2)?;
            Ok((&response.payload[..]).get_u16())
        }
        _ => Err(failure(MessageType::DeleteMany, response)),
    }
}

/// Decode a TTL response into seconds; `None` when the key is missing
pub fn decode_ttl(response: &Response) -> Result<Option<f64>> {
    match response.response_tag() {
        Some(ResponseTag::Ttl) => {
            expect_len("TL", &response.payload, 8)?;
            let millis = (&response.payload[..]).get_u64();
            Ok(Some(millis as f64 / 1000.0))
        }
        _ => not_found_or_failure(MessageType::Ttl, response),
    }
}

/// Decode a key listing; an empty payload is an empty list
pub fn decode_keys(response: &Response) -> Result<Vec<String>> {
    match response.response_tag() {
        Some(ResponseTag::Keys) => {
            if response.payload.is_empty() {
                return Ok(Vec::new());
            }
            response
                .payload
                .split(|b| *b == KEY_SEPARATOR)
                .map(|key| {
                    String::from_utf8(key.to_vec()).map_err(|e| {
                        CupidError::Serialization(format!("key is not valid UTF-8: {}", e))
                    })
                })
                .collect()
        }
        _ => Err(failure(MessageType::Keys, response)),
    }
}

/// Decode the response to a table query
///
/// The payload carries a 4-byte unsigned metadata length, the metadata
/// JSON map and then the columnar stream.
pub fn decode_table(response: &Response) -> Result<Option<RecordBatch>> {
    match response.response_tag() {
        Some(ResponseTag::Table) => {
            let payload = &response.payload[..];
            if payload.len() < 4 {
                return Err(CupidError::MalformedPayload {
                    tag: "AR",
                    expected: 4,
                    actual: payload.len(),
                });
            }
            let meta_len = (&payload[..4]).get_u32() as usize;
            let body = &payload[4..];
            if body.len() < meta_len {
                return Err(CupidError::MalformedPayload {
                    tag: "AR",
                    expected: 4 + meta_len,
                    actual: payload.len(),
                });
            }

            let metadata = if meta_len > 0 {
                Some(serde_json::from_slice::<TableMetadata>(&body[..meta_len])?)
            } else {
                None
            };

            table::decode_table(&body[meta_len..], metadata).map(Some)
        }
        _ => not_found_or_failure(MessageType::GetTable, response),
    }
}

/// Decode the response to a plain get
///
/// Table values come back as a bare columnar stream here, without the
/// metadata prefix used by table queries.
pub fn decode_value(response: &Response) -> Result<Option<Value>> {
    let payload = &response.payload;
    match response.response_tag() {
        Some(ResponseTag::Integer) => read_i64(payload).map(|v| Some(Value::Integer(v))),
        Some(ResponseTag::Float) => read_f64(payload).map(|v| Some(Value::Float(v))),
        Some(ResponseTag::Blob) => Ok(Some(Value::Blob(payload.clone()))),
        Some(ResponseTag::Table) => {
            table::decode_table(payload, None).map(|t| Some(Value::Table(t)))
        }
        _ => not_found_or_failure(MessageType::Get, response),
    }
}
