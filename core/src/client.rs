//! Blocking GET client.
//!
//! # Design
//! `HttpClient` composes the URL parser, the connection manager, the
//! key/value formatters and the response reader. A call walks
//! `Connecting -> RequestSent -> ReadingResponse -> Done`; any failure ends
//! the call with an `HttpError` and no partial `Response`.
//!
//! Every call opens its own connection and closes it before returning, on
//! success and on every error path. Calls take `&mut self`, so one client
//! never runs two exchanges at once.

use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::error::HttpError;
use crate::kv::{Headers, QueryParameters};
use crate::response::{Response, ResponseReader};
use crate::transport::{Connection, OutgoingRequest, TcpTransport, Transport};
use crate::url_parser::{self, UrlComponents};

/// Synchronous HTTP GET client owning one transport session.
pub struct HttpClient<T: Transport = TcpTransport> {
    config: ClientConfig,
    connections: ConnectionManager<T>,
}

impl HttpClient<TcpTransport> {
    /// A client identifying itself as `HttpClient`.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::with_user_agent(user_agent))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, TcpTransport)
    }
}

impl Default for HttpClient<TcpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> HttpClient<T> {
    /// Open a session on `transport`. A failed session does not fail here;
    /// every later call reports it as `SessionNotInitialized`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let session = transport.open_session(&config);
        Self {
            config,
            connections: ConnectionManager::new(session),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get(&mut self, url: &str) -> Result<Response, HttpError> {
        self.get_with(url, &QueryParameters::new(), &Headers::new())
    }

    /// GET `url` with extra query parameters and request headers.
    pub fn get_with(
        &mut self,
        url: &str,
        params: &QueryParameters,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.connections.ensure_session()?;
        let components = url_parser::parse(url)?;

        let result = self.exchange(&components, params, headers);
        self.connections.close();

        match &result {
            Ok(response) => log::debug!(
                "GET {url} -> {} ({} bytes)",
                response.status_code,
                response.content.len()
            ),
            Err(err) => log::warn!("GET {url} failed: {err}"),
        }
        result
    }

    fn exchange(
        &mut self,
        url: &UrlComponents,
        params: &QueryParameters,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        let target = url.request_target(&params.format());
        let header_block = headers.format();
        let chunk_size = self.config.chunk_size();

        let conn = self.connections.connect(url)?;
        let request = OutgoingRequest {
            method: "GET",
            target: &target,
            headers: &header_block,
            reload: true,
        };
        log::debug!("sending GET {target}");
        let mut handle = conn
            .send_request(&request)
            .map_err(HttpError::RequestSendFailed)?;

        ResponseReader::new(&mut handle, chunk_size).read()
    }
}
