//! The transport collaborator.
//!
//! # Design
//! The client speaks to the network only through these traits, mirroring the
//! primitives a platform HTTP stack offers: open a session, connect, send a
//! request, then query status, query raw headers and read body chunks.
//!
//! Closing is `Drop`. A request handle borrows its connection mutably, so the
//! borrow checker guarantees it is released before the connection is.

pub mod tcp;

#[cfg(test)]
pub(crate) mod mock;

use crate::config::ClientConfig;
use crate::error::TransportError;

pub use tcp::TcpTransport;

/// A GET request as handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutgoingRequest<'a> {
    pub method: &'a str,
    /// Path plus query, as it appears on the request line.
    pub target: &'a str,
    /// Caller header block, `Name: value\r\n` per line, possibly empty.
    pub headers: &'a str,
    /// Bypass any cache between the client and the origin.
    pub reload: bool,
}

/// Factory for sessions.
pub trait Transport {
    type Session: Session;

    fn open_session(&self, config: &ClientConfig) -> Result<Self::Session, TransportError>;
}

/// Process-level handle carrying the client's identity.
pub trait Session {
    type Connection: Connection;

    fn connect(&self, host: &str, port: u16, secure: bool) -> Result<Self::Connection, TransportError>;
}

/// An established channel to one host and port.
pub trait Connection {
    type Request<'c>: RequestHandle
    where
        Self: 'c;

    fn send_request(&mut self, request: &OutgoingRequest<'_>) -> Result<Self::Request<'_>, TransportError>;
}

/// One in-flight exchange over an open connection.
pub trait RequestHandle {
    fn status_code(&mut self) -> Result<u16, TransportError>;

    /// The header block as received, status line included, CRLF separated.
    fn raw_headers(&mut self) -> Result<String, TransportError>;

    /// Read the next body bytes into `buf`. `Ok(0)` means end of body.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}
