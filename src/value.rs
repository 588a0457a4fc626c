//! Stored values
//!
//! The tagged union of everything a key can hold, plus the blob serializer.

use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CupidError, Result};
use crate::table;

/// Single-byte value kind written after the key in a set request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    Integer = b'I',
    Float = b'F',
    Blob = b'B',
    Table = b'A',
}

impl DataType {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A value stored under a key
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    /// Serialized bytes; see [`encode_blob`] / [`decode_blob`]
    Blob(Bytes),
    Table(RecordBatch),
}

impl Value {
    /// Serialize any serde value into a blob
    pub fn blob<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Value::Blob(Bytes::from(encode_blob(value)?)))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Blob(_) => DataType::Blob,
            Value::Table(_) => DataType::Table,
        }
    }

    /// Bytes that follow the data-type byte in a set request
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        match self {
            Value::Integer(v) => Ok(v.to_be_bytes().to_vec()),
            Value::Float(v) => Ok(v.to_be_bytes().to_vec()),
            Value::Blob(bytes) => Ok(bytes.to_vec()),
            Value::Table(batch) => table::encode_table(batch),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&RecordBatch> {
        match self {
            Value::Table(batch) => Some(batch),
            _ => None,
        }
    }

    /// Decode a blob value into `T`
    ///
    /// Non-blob values are reported as `InvalidDataType`.
    pub fn decode_blob<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Value::Blob(bytes) => decode_blob(bytes),
            _ => Err(CupidError::InvalidDataType),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<RecordBatch> for Value {
    fn from(batch: RecordBatch) -> Self {
        Value::Table(batch)
    }
}

// =============================================================================
// Blob Serializer
// =============================================================================

/// Serialize an arbitrary value into blob bytes
pub fn encode_blob<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| CupidError::Serialization(e.to_string()))
}

/// Deserialize blob bytes; malformed input becomes `InvalidBlobData`
pub fn decode_blob<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| CupidError::InvalidBlobData(e.to_string()))
}
