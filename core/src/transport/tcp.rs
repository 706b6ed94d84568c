//! Blocking HTTP/1.0 transport over `std::net::TcpStream`, with TLS from
//! `rustls` for `https` connections.
//!
//! # Design
//! Each connection carries exactly one request and sends `Connection: close`,
//! so the body ends either after `Content-Length` bytes or at EOF. Requests
//! go out as HTTP/1.0 so servers do not apply transfer codings; a response
//! that carries one anyway fails the body read instead of being returned
//! undecoded. Interim `1xx` heads are skipped. The TLS handshake is driven to completion inside
//! `connect`, so certificate and handshake failures are connect failures.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConnection, RootCertStore, StreamOwned};

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::transport::{Connection, OutgoingRequest, RequestHandle, Session, Transport};

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

/// The default transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpTransport;

impl Transport for TcpTransport {
    type Session = TcpSession;

    fn open_session(&self, config: &ClientConfig) -> Result<TcpSession, TransportError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let tls = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| TransportError::new(format!("TLS setup failed: {e}")))?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(TcpSession {
            user_agent: config.user_agent.clone(),
            tls: Arc::new(tls),
            connect_timeout: config.connect_timeout().filter(|d| !d.is_zero()),
            io_timeout: config.read_timeout().filter(|d| !d.is_zero()),
            max_header_bytes: config.max_header_bytes,
        })
    }
}

pub struct TcpSession {
    user_agent: String,
    tls: Arc<rustls::ClientConfig>,
    connect_timeout: Option<Duration>,
    io_timeout: Option<Duration>,
    max_header_bytes: usize,
}

impl Session for TcpSession {
    type Connection = TcpConnection;

    fn connect(&self, host: &str, port: u16, secure: bool) -> Result<TcpConnection, TransportError> {
        let tcp = self.open_socket(host, port)?;
        tcp.set_read_timeout(self.io_timeout)
            .and_then(|()| tcp.set_write_timeout(self.io_timeout))
            .and_then(|()| tcp.set_nodelay(true))
            .map_err(|e| io_error("failed to configure socket", e))?;

        let stream = if secure {
            Stream::Tls(Box::new(self.handshake(host, tcp)?))
        } else {
            Stream::Plain(tcp)
        };

        let default_port = if secure { HTTPS_PORT } else { HTTP_PORT };
        let host = if host.contains(':') {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        let host_header = if port == default_port {
            host
        } else {
            format!("{host}:{port}")
        };

        Ok(TcpConnection {
            host_header,
            user_agent: self.user_agent.clone(),
            max_header_bytes: self.max_header_bytes,
            reader: BufReader::new(stream),
        })
    }
}

impl TcpSession {
    fn open_socket(&self, host: &str, port: u16) -> Result<TcpStream, TransportError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| io_error(&format!("failed to resolve `{host}`"), e))?;

        let mut last_err = TransportError::new(format!("`{host}` resolved to no addresses"));
        for addr in addrs {
            let attempt = match self.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(tcp) => return Ok(tcp),
                Err(e) => {
                    log::debug!("connect to {addr} failed: {e}");
                    last_err = io_error(&format!("failed to connect to {addr}"), e);
                }
            }
        }
        Err(last_err)
    }

    fn handshake(
        &self,
        host: &str,
        mut tcp: TcpStream,
    ) -> Result<StreamOwned<ClientConnection, TcpStream>, TransportError> {
        let name = ServerName::try_from(host.to_string())
            .map_err(|e| TransportError::new(format!("invalid TLS server name `{host}`: {e}")))?;
        let mut conn = ClientConnection::new(self.tls.clone(), name)
            .map_err(|e| TransportError::new(format!("TLS setup failed: {e}")))?;
        while conn.is_handshaking() {
            conn.complete_io(&mut tcp)
                .map_err(|e| io_error("TLS handshake failed", e))?;
        }
        Ok(StreamOwned::new(conn, tcp))
    }
}

enum Stream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.read(buf),
            // Peers that close without close_notify are treated as a clean EOF.
            Stream::Tls(s) => match s.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
                other => other,
            },
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.write(buf),
            Stream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(s) => s.flush(),
            Stream::Tls(s) => s.flush(),
        }
    }
}

pub struct TcpConnection {
    host_header: String,
    user_agent: String,
    max_header_bytes: usize,
    reader: BufReader<Stream>,
}

impl Connection for TcpConnection {
    type Request<'c> = TcpRequest<'c>;

    fn send_request(&mut self, request: &OutgoingRequest<'_>) -> Result<TcpRequest<'_>, TransportError> {
        let wire = self.render(request);
        let stream = self.reader.get_mut();
        stream
            .write_all(wire.as_bytes())
            .and_then(|()| stream.flush())
            .map_err(|e| io_error("failed to write request", e))?;

        Ok(TcpRequest {
            reader: &mut self.reader,
            max_header_bytes: self.max_header_bytes,
            head: None,
            consumed: 0,
        })
    }
}

impl TcpConnection {
    fn render(&self, request: &OutgoingRequest<'_>) -> String {
        let mut wire = format!(
            "{} {} HTTP/1.0\r\nHost: {}\r\n",
            request.method, request.target, self.host_header
        );
        if !has_header(request.headers, "user-agent") {
            wire.push_str(&format!("User-Agent: {}\r\n", self.user_agent));
        }
        if !has_header(request.headers, "accept-encoding") {
            wire.push_str("Accept-Encoding: identity\r\n");
        }
        if request.reload && !has_header(request.headers, "cache-control") {
            wire.push_str("Cache-Control: no-cache\r\n");
        }
        wire.push_str("Connection: close\r\n");
        wire.push_str(request.headers);
        wire.push_str("\r\n");
        wire
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        if let Stream::Tls(tls) = self.reader.get_mut() {
            let tls = &mut **tls;
            tls.conn.send_close_notify();
            let _ = tls.conn.write_tls(&mut tls.sock);
        }
        log::debug!("closed connection to {}", self.host_header);
    }
}

/// The response head is read on first use, so a peer that closes without
/// answering fails the status query rather than the send.
pub struct TcpRequest<'c> {
    reader: &'c mut BufReader<Stream>,
    max_header_bytes: usize,
    head: Option<Result<Head, TransportError>>,
    consumed: u64,
}

impl TcpRequest<'_> {
    fn head(&mut self) -> Result<&Head, TransportError> {
        let reader = &mut *self.reader;
        let limit = self.max_header_bytes;
        self.head
            .get_or_insert_with(|| read_final_head(reader, limit))
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl RequestHandle for TcpRequest<'_> {
    fn status_code(&mut self) -> Result<u16, TransportError> {
        self.head()?.status.clone()
    }

    fn raw_headers(&mut self) -> Result<String, TransportError> {
        Ok(self.head()?.raw.clone())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let (length, coding) = {
            let head = self.head()?;
            (head.body_length(), head.transfer_coding.clone())
        };
        let remaining = length.map(|len| len.saturating_sub(self.consumed));
        if remaining == Some(0) {
            return Ok(0);
        }
        if let Some(coding) = coding {
            return Err(TransportError::new(format!(
                "unsupported transfer coding `{coding}`"
            )));
        }
        let want = match remaining {
            Some(n) => usize::try_from(n).map_or(buf.len(), |n| n.min(buf.len())),
            None => buf.len(),
        };
        let n = loop {
            match self.reader.read(&mut buf[..want]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_error("failed to read response body", e)),
            }
        };
        if let Some(remaining) = remaining {
            if n == 0 {
                return Err(TransportError::new(format!(
                    "connection closed with {remaining} body bytes outstanding"
                )));
            }
        }
        self.consumed += n as u64;
        Ok(n)
    }
}

#[derive(Debug)]
struct Head {
    raw: String,
    status: Result<u16, TransportError>,
    content_length: Option<u64>,
    /// Any coding other than `identity`.
    transfer_coding: Option<String>,
}

impl Head {
    fn body_length(&self) -> Option<u64> {
        match self.status {
            Ok(204 | 304) => Some(0),
            _ if self.transfer_coding.is_some() => None,
            _ => self.content_length,
        }
    }
}

/// Read heads until one is not an interim `1xx` response.
fn read_final_head<R: BufRead>(reader: &mut R, limit: usize) -> Result<Head, TransportError> {
    loop {
        let head = read_head(reader, limit)?;
        match head.status {
            Ok(status @ 100..=199) => log::debug!("skipping interim {status} response"),
            _ => return Ok(head),
        }
    }
}

/// Read the status line and header block, up to and including the blank line.
fn read_head<R: BufRead>(reader: &mut R, limit: usize) -> Result<Head, TransportError> {
    let mut raw = Vec::new();
    loop {
        let start = raw.len();
        let budget = (limit + 1).saturating_sub(start) as u64;
        let n = reader
            .by_ref()
            .take(budget)
            .read_until(b'\n', &mut raw)
            .map_err(|e| io_error("failed to read response head", e))?;
        if n == 0 {
            return Err(TransportError::new(
                "connection closed before the response head was complete",
            ));
        }
        if raw.len() > limit {
            return Err(TransportError::new(format!("response head exceeds {limit} bytes")));
        }
        let line = &raw[start..];
        if line == b"\r\n" || line == b"\n" {
            if start == 0 {
                raw.clear();
                continue;
            }
            break;
        }
    }

    let raw = String::from_utf8_lossy(&raw).into_owned();
    let status = parse_status_line(raw.lines().next().unwrap_or_default());
    let content_length = header_value(&raw, "content-length").and_then(|v| v.parse().ok());
    let transfer_coding = header_value(&raw, "transfer-encoding")
        .filter(|v| !v.eq_ignore_ascii_case("identity"))
        .map(str::to_string);

    Ok(Head {
        raw,
        status,
        content_length,
        transfer_coding,
    })
}

fn parse_status_line(line: &str) -> Result<u16, TransportError> {
    let mut parts = line.split_whitespace();
    let version = parts.next().unwrap_or_default();
    let code = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") || code.len() != 3 {
        return Err(TransportError::new(format!("invalid status line `{}`", line.trim_end())));
    }
    code.parse()
        .map_err(|_| TransportError::new(format!("invalid status code `{code}`")))
}

fn header_value<'a>(block: &'a str, name: &str) -> Option<&'a str> {
    block
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
}

fn has_header(block: &str, name: &str) -> bool {
    header_value(block, name).is_some()
}

fn io_error(context: &str, err: io::Error) -> TransportError {
    TransportError {
        message: format!("{context}: {err}"),
        code: err.raw_os_error(),
    }
}
