//! Minimal synchronous HTTP GET client.
//!
//! # Overview
//! `HttpClient::get_with` parses a URL, opens a TCP (or TLS) connection to
//! its host, sends a GET with optional query parameters and headers, and
//! returns the status code, response headers and body as a `Response`.
//!
//! # Design
//! - Network access goes through the `transport` traits. `TcpTransport` is
//!   the default; tests substitute a scripted transport.
//! - One connection per call, closed on every exit path. No pooling,
//!   redirects, compression, chunked decoding or cookies.
//! - Failures are `HttpError` values carrying the transport error code
//!   captured where the failure happened.
//! - Query values are percent-encoded (`application/x-www-form-urlencoded`).
//!   Header names and values are sent as given.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod kv;
pub mod response;
pub mod transport;
pub mod url_parser;

pub use client::HttpClient;
pub use config::ClientConfig;
pub use error::{ErrorKind, HttpError, TransportError, UrlComponent};
pub use kv::{Headers, KeyValues, QueryParameters, WireStyle};
pub use response::Response;
pub use transport::TcpTransport;
pub use url_parser::UrlComponents;
