//! Connection management.
//!
//! # Design
//! `ConnectionManager` owns the transport session and at most one live
//! connection. Opening a new connection always drops (closes) the previous
//! one first. Port and security are derived from the URL scheme here, not in
//! the URL parser.

use crate::error::{HttpError, TransportError};
use crate::transport::{Session, Transport};
use crate::url_parser::UrlComponents;

pub const DEFAULT_HTTP_PORT: u16 = 80;
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Where and how to connect for a given URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub secure: bool,
}

impl ConnectionParams {
    pub fn derive(url: &UrlComponents) -> Self {
        let secure = url.scheme == "https";
        let port = match url.port {
            0 if secure => DEFAULT_HTTPS_PORT,
            0 => DEFAULT_HTTP_PORT,
            explicit => explicit,
        };
        Self {
            host: url.host.clone(),
            port,
            secure,
        }
    }
}

struct Active<C> {
    conn: C,
    params: ConnectionParams,
}

/// Session plus the single active connection of one client.
pub struct ConnectionManager<T: Transport> {
    session: Result<T::Session, TransportError>,
    active: Option<Active<<T::Session as Session>::Connection>>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(session: Result<T::Session, TransportError>) -> Self {
        if let Err(err) = &session {
            log::warn!("transport session failed to open: {err}");
        }
        Self {
            session,
            active: None,
        }
    }

    pub fn ensure_session(&self) -> Result<(), HttpError> {
        match &self.session {
            Ok(_) => Ok(()),
            Err(err) => Err(HttpError::SessionNotInitialized(err.clone())),
        }
    }

    /// Close any open connection, then connect to the host named by `url`.
    pub fn connect(
        &mut self,
        url: &UrlComponents,
    ) -> Result<&mut <T::Session as Session>::Connection, HttpError> {
        self.close();

        let session = match &self.session {
            Ok(session) => session,
            Err(err) => return Err(HttpError::SessionNotInitialized(err.clone())),
        };
        let params = ConnectionParams::derive(url);
        log::debug!(
            "connecting to {}:{} (secure: {})",
            params.host,
            params.port,
            params.secure
        );

        match session.connect(&params.host, params.port, params.secure) {
            Ok(conn) => {
                let active = self.active.insert(Active { conn, params });
                Ok(&mut active.conn)
            }
            Err(source) => {
                log::warn!("connect to {}:{} failed: {source}", params.host, params.port);
                Err(HttpError::ConnectFailed {
                    host: params.host,
                    port: params.port,
                    source,
                })
            }
        }
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Drop the live connection. A no-op when nothing is open.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            log::debug!("closing connection to {}:{}", active.params.host, active.params.port);
        }
    }
}
