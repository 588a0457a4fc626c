//! Client Module
//!
//! The public API: one method per command, each a single round trip.
//!
//! ## Responsibilities
//! - Build the command for each operation
//! - Send it over the shared transport
//! - Decode the response into a typed result or error
//!
//! Missing keys are a normal outcome for reads: `get`, `delete`, `touch`
//! and `ttl` return `None`/`false` instead of failing.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::filter::Query;
use crate::network::Transport;
use crate::protocol::{self, Command, MessageType};
use crate::value::Value;

/// A CupidDB client bound to one connection
///
/// `Client` is `Sync`: it can be shared between threads, and their requests
/// are queued on the connection one at a time.
pub struct Client<S = TcpStream> {
    transport: Transport<S>,
}

impl Client<TcpStream> {
    /// Connect to a server
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        Ok(Self::from_transport(Transport::connect(config)?))
    }

    /// Close the connection
    pub fn close(&self) -> Result<()> {
        self.transport.close()
    }
}

impl<S: Read + Write> Client<S> {
    pub fn from_transport(transport: Transport<S>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport<S> {
        &self.transport
    }

    pub fn into_transport(self) -> Transport<S> {
        self.transport
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store a value under `key`; `Duration::ZERO` means no expiry
    pub fn set(&self, key: &str, value: impl Into<Value>, ttl: Duration) -> Result<bool> {
        let command = Command::Set {
            key: key.to_string(),
            value: value.into(),
            ttl,
        };
        protocol::decode_set(&self.transport.execute(&command)?)
    }

    pub fn set_int(&self, key: &str, value: i64, ttl: Duration) -> Result<bool> {
        self.set(key, Value::Integer(value), ttl)
    }

    pub fn set_float(&self, key: &str, value: f64, ttl: Duration) -> Result<bool> {
        self.set(key, Value::Float(value), ttl)
    }

    /// Serialize `value` and store it as a blob
    pub fn set_blob<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<bool> {
        self.set(key, Value::blob(value)?, ttl)
    }

    pub fn set_table(&self, key: &str, table: &RecordBatch, ttl: Duration) -> Result<bool> {
        self.set(key, Value::Table(table.clone()), ttl)
    }

    /// Add `delta` to an integer value, creating it when missing
    pub fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let command = Command::IncrInt {
            key: key.to_string(),
            delta,
        };
        protocol::decode_int(&self.transport.execute(&command)?)
    }

    /// Add `delta` to a float value, creating it when missing
    pub fn incr_float(&self, key: &str, delta: f64) -> Result<f64> {
        let command = Command::IncrFloat {
            key: key.to_string(),
            delta,
        };
        protocol::decode_float(&self.transport.execute(&command)?)
    }

    /// Remove a key; `false` if it did not exist
    pub fn delete(&self, key: &str) -> Result<bool> {
        let command = Command::Delete {
            key: key.to_string(),
        };
        protocol::decode_exists(MessageType::Delete, &self.transport.execute(&command)?)
    }

    /// Remove several keys, returning how many existed
    pub fn delete_many<I, K>(&self, keys: I) -> Result<u16>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let command = Command::DeleteMany {
            keys: keys.into_iter().map(Into::into).collect(),
        };
        protocol::decode_deleted_count(&self.transport.execute(&command)?)
    }

    /// Reset the TTL of an existing key; `false` if it did not exist
    pub fn touch(&self, key: &str, ttl: Duration) -> Result<bool> {
        let command = Command::Touch {
            key: key.to_string(),
            ttl,
        };
        protocol::decode_exists(MessageType::Touch, &self.transport.execute(&command)?)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch a value of any kind
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let command = Command::Get {
            key: key.to_string(),
        };
        protocol::decode_value(&self.transport.execute(&command)?)
    }

    /// Fetch a value, falling back to `default` when the key is missing
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Result<Value> {
        Ok(self.get(key)?.unwrap_or_else(|| default.into()))
    }

    /// Fetch a blob and deserialize it
    pub fn get_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)?.map(|value| value.decode_blob()).transpose()
    }

    /// Fetch a whole table
    pub fn get_table(&self, key: &str) -> Result<Option<RecordBatch>> {
        self.query(Query::new(key))
    }

    /// Fetch a table with projection and row filters applied on the server
    ///
    /// Fails with `InvalidTableData` when the key holds a non-table value.
    pub fn query(&self, query: Query) -> Result<Option<RecordBatch>> {
        protocol::decode_table(&self.transport.execute(&Command::GetTable(query))?)
    }

    /// Remaining TTL in seconds; `Some(0.0)` means no expiry
    pub fn ttl(&self, key: &str) -> Result<Option<f64>> {
        let command = Command::Ttl {
            key: key.to_string(),
        };
        protocol::decode_ttl(&self.transport.execute(&command)?)
    }

    pub fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.ttl(key)?.is_some())
    }

    /// List every live key
    pub fn keys(&self) -> Result<Vec<String>> {
        protocol::decode_keys(&self.transport.execute(&Command::Keys { pattern: None })?)
    }

    /// List live keys matching a glob pattern (matched by the server)
    ///
    /// An empty pattern lists every key.
    pub fn keys_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let command = Command::Keys {
            pattern: (!pattern.is_empty()).then(|| pattern.to_string()),
        };
        protocol::decode_keys(&self.transport.execute(&command)?)
    }
}
