//! Transport
//!
//! Owns one connection and runs one request/response exchange at a time.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

use bytes::BytesMut;
use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::error::{CupidError, Result};
use crate::protocol::{
    encode_command, encode_request, Command, MessageType, Response, ResponseHeader,
    RESPONSE_HEADER_SIZE,
};

/// Connection state guarded together with the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Idle and in sync with the server
    Ready,
    /// A previous exchange failed mid-flight; the stream is out of sync
    Broken,
    /// Closed by the caller
    Closed,
}

struct Inner<S> {
    stream: S,
    state: State,
}

/// A single connection to the server
///
/// ## Concurrency Model
/// The whole write-request / read-response sequence runs under one mutex,
/// so callers sharing a transport are served strictly one at a time and
/// their bytes never interleave on the wire.
///
/// ## Failure Model
/// Any error during an exchange (socket failure, short stream, wrong
/// protocol marker) leaves the stream in an unknown position. The transport
/// is then marked broken and every later call fails with
/// `CupidError::ConnectionBroken`. There is no reconnection.
pub struct Transport<S = TcpStream> {
    inner: Mutex<Inner<S>>,

    /// Upper bound for a single payload read
    chunk_size: usize,
}

impl Transport<TcpStream> {
    /// Open a TCP connection using the given config
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let addr = config.addr();
        let stream = TcpStream::connect(&addr)?;

        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        tracing::debug!("Connected to {}", addr);
        Self::from_stream(stream, config.chunk_size())
    }

    /// Shut the socket down; later calls fail with `ConnectionClosed`
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == State::Closed {
            return Ok(());
        }
        inner.state = State::Closed;

        match inner.stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            // Peer already hung up
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!("Connection closed");
        Ok(())
    }
}

impl<S: Read + Write> Transport<S> {
    /// Wrap an already connected stream
    pub fn from_stream(stream: S, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CupidError::Config("chunk size must be non-zero".to_string()));
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                stream,
                state: State::Ready,
            }),
            chunk_size,
        })
    }

    /// Encode a command and send it
    pub fn execute(&self, command: &Command) -> Result<Response> {
        let payload = encode_command(command)?;
        self.send(command.message_type(), &payload)
    }

    /// Send one request and block until its response has been read
    pub fn send(&self, message_type: MessageType, payload: &[u8]) -> Result<Response> {
        let frame = encode_request(message_type, payload);

        let mut inner = self.inner.lock();
        match inner.state {
            State::Ready => {}
            State::Broken => return Err(CupidError::ConnectionBroken),
            State::Closed => return Err(CupidError::ConnectionClosed),
        }

        match exchange(&mut inner.stream, &frame, self.chunk_size) {
            Ok(response) => {
                tracing::trace!(
                    "{} request ({} bytes) -> {} response ({} bytes)",
                    message_type,
                    payload.len(),
                    response.tag_str(),
                    response.payload.len()
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!("{} request failed, connection unusable: {}", message_type, e);
                inner.state = State::Broken;
                Err(e)
            }
        }
    }

    /// Whether a previous failure left the connection unusable
    pub fn is_broken(&self) -> bool {
        self.inner.lock().state == State::Broken
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Take back the underlying stream
    pub fn into_inner(self) -> S {
        self.inner.into_inner().stream
    }
}

// =============================================================================
// Exchange
// =============================================================================

/// Write a framed request, then read the header and payload of the response
fn exchange<S: Read + Write>(stream: &mut S, frame: &[u8], chunk_size: usize) -> Result<Response> {
    stream.write_all(frame)?;
    stream.flush()?;

    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    read_full(stream, &mut header)?;
    let header = ResponseHeader::decode(&header)?;

    let payload = read_payload(stream, header.payload_len_usize()?, chunk_size)?;
    Ok(Response::new(header.tag, payload.freeze()))
}

/// Fill `buf` completely, tolerating short reads
fn read_full<S: Read>(stream: &mut S, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(eof(buf.len() - filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Read exactly `len` payload bytes in reads of at most `chunk_size`
fn read_payload<S: Read>(stream: &mut S, len: usize, chunk_size: usize) -> Result<BytesMut> {
    let mut payload = BytesMut::with_capacity(len.min(chunk_size));
    while payload.len() < len {
        let start = payload.len();
        let want = (len - start).min(chunk_size);
        payload.resize(start + want, 0);

        match stream.read(&mut payload[start..]) {
            Ok(0) => return Err(eof(len - start)),
            Ok(n) => payload.truncate(start + n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => payload.truncate(start),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(payload)
}

fn eof(missing: usize) -> CupidError {
    CupidError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("connection closed with {} response bytes outstanding", missing),
    ))
}
