//! Client configuration.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_USER_AGENT: &str = "HttpClient";
pub const DEFAULT_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

/// Settings shared by the client and the transport session it opens.
///
/// Every field has a default, so a partial JSON/TOML document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Sent as `User-Agent` unless the caller supplies that header.
    pub user_agent: String,
    /// Size of each body read. Zero is treated as one.
    pub chunk_size: usize,
    pub connect_timeout_ms: Option<u64>,
    /// Applied to socket reads and writes.
    pub read_timeout_ms: Option<u64>,
    /// Upper bound on the status line plus header block.
    pub max_header_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout_ms: None,
            read_timeout_ms: None,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}
