//! Network Module
//!
//! Client-side connection handling.
//!
//! ## Architecture
//! - One TCP socket per `Transport`
//! - One request in flight per socket, enforced by a mutex
//! - Blocking I/O only; timeouts come from socket options

mod transport;

pub use transport::Transport;
