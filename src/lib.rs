//! # CupidDB
//!
//! A blocking client for CupidDB, a remote typed key-value store with:
//! - Integer, float, blob and table (Arrow) values
//! - Per-key TTLs
//! - Server-side column projection and row filtering for tables
//! - One persistent TCP connection, one request in flight at a time
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                                │
//! │             (one method per command kind)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Command Encoder                             │
//! │        (payload layouts, JSON queries, Arrow IPC)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ (type, payload)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Transport                                │
//! │         (framing, Mutex around send + receive)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Response
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Response Decoder                             │
//! │            (tags, error codes, typed values)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod filter;
pub mod value;
pub mod table;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CupidError, Result};
pub use config::ClientConfig;
pub use client::Client;
pub use filter::{FilterLogic, FilterOp, FilterType, FilterValue, Query, RowFilter};
pub use value::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the CupidDB client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
