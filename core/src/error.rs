//! Error types for the HTTP client.
//!
//! # Design
//! Every failure of a GET call surfaces as one `HttpError` variant. Variants
//! caused by the transport wrap a `TransportError` that carries the message
//! and, when the platform supplied one, the numeric error code captured at
//! the failure site. Nothing here reads ambient "last error" state.

use std::fmt;
use std::io;

use thiserror::Error;

/// A failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub code: Option<i32>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (error {code})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self {
            message: err.to_string(),
            code: err.raw_os_error(),
        }
    }
}

/// Which part of a URL exceeded its length limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlComponent {
    Scheme,
    Host,
    Path,
    Extra,
}

impl fmt::Display for UrlComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UrlComponent::Scheme => "scheme",
            UrlComponent::Host => "host",
            UrlComponent::Path => "path",
            UrlComponent::Extra => "query/fragment",
        };
        f.write_str(name)
    }
}

/// Errors returned by `HttpClient::get` and `HttpClient::get_with`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The transport session could not be opened when the client was built.
    #[error("failed to initialize an HTTP session: {0}")]
    SessionNotInitialized(#[source] TransportError),

    /// The URL could not be decomposed.
    #[error("malformed URL `{url}`: {reason}")]
    MalformedUrl { url: String, reason: String },

    /// A URL component is longer than the parser accepts.
    #[error("URL {component} is {len} characters long, limit is {max}")]
    UrlTooLong {
        component: UrlComponent,
        len: usize,
        max: usize,
    },

    /// DNS, TCP or TLS setup failed.
    #[error("failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    /// The request could not be dispatched over an open connection.
    #[error("failed to send request: {0}")]
    RequestSendFailed(#[source] TransportError),

    /// The response status code could not be retrieved.
    #[error("status code unavailable: {0}")]
    StatusUnavailable(#[source] TransportError),

    /// The raw response header block could not be retrieved.
    #[error("response headers unavailable: {0}")]
    HeadersUnavailable(#[source] TransportError),

    /// Reading the body failed mid-stream.
    #[error("failed to read the HTTP response: {0}")]
    ReadFailed(#[source] TransportError),
}

/// Fieldless mirror of `HttpError` for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SessionNotInitialized,
    MalformedUrl,
    UrlTooLong,
    ConnectFailed,
    RequestSendFailed,
    StatusUnavailable,
    HeadersUnavailable,
    ReadFailed,
}

impl HttpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::SessionNotInitialized(_) => ErrorKind::SessionNotInitialized,
            HttpError::MalformedUrl { .. } => ErrorKind::MalformedUrl,
            HttpError::UrlTooLong { .. } => ErrorKind::UrlTooLong,
            HttpError::ConnectFailed { .. } => ErrorKind::ConnectFailed,
            HttpError::RequestSendFailed(_) => ErrorKind::RequestSendFailed,
            HttpError::StatusUnavailable(_) => ErrorKind::StatusUnavailable,
            HttpError::HeadersUnavailable(_) => ErrorKind::HeadersUnavailable,
            HttpError::ReadFailed(_) => ErrorKind::ReadFailed,
        }
    }

    /// The transport error code behind this failure, if one was reported.
    pub fn code(&self) -> Option<i32> {
        match self {
            HttpError::SessionNotInitialized(e)
            | HttpError::RequestSendFailed(e)
            | HttpError::StatusUnavailable(e)
            | HttpError::HeadersUnavailable(e)
            | HttpError::ReadFailed(e) => e.code,
            HttpError::ConnectFailed { source, .. } => source.code,
            HttpError::MalformedUrl { .. } | HttpError::UrlTooLong { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_includes_code() {
        let err = TransportError::with_code("connection refused", 111);
        assert_eq!(err.to_string(), "connection refused (error 111)");
        assert_eq!(TransportError::new("eof").to_string(), "eof");
    }

    #[test]
    fn io_error_keeps_os_code() {
        let err: TransportError = io::Error::from_raw_os_error(104).into();
        assert_eq!(err.code, Some(104));
    }

    #[test]
    fn code_is_taken_from_the_failure_site() {
        let err = HttpError::ConnectFailed {
            host: "example.com".to_string(),
            port: 443,
            source: TransportError::with_code("dns failure", -2),
        };
        assert_eq!(err.code(), Some(-2));
        assert_eq!(err.kind(), ErrorKind::ConnectFailed);
        assert!(err.to_string().starts_with("failed to connect to example.com:443"));

        let err = HttpError::UrlTooLong {
            component: UrlComponent::Host,
            len: 300,
            max: 255,
        };
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "URL host is 300 characters long, limit is 255");
    }
}
