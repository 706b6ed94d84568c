//! Scripted transport for unit tests. Records every session, connect,
//! request and close so tests can check handle accounting.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::transport::{Connection, OutgoingRequest, RequestHandle, Session, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentRequest {
    pub host: String,
    pub method: String,
    pub target: String,
    pub headers: String,
    pub reload: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockLog {
    pub user_agents: Vec<String>,
    pub connect_attempts: Vec<(String, u16, bool)>,
    pub opens: usize,
    pub closes: usize,
    pub live: usize,
    pub max_live: usize,
    pub requests: Vec<SentRequest>,
    pub request_closes: usize,
}

/// What the mock answers. Body chunks are replayed for every request.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub fail_session: Option<TransportError>,
    pub fail_connect: Option<TransportError>,
    pub fail_send: Option<TransportError>,
    pub status: Result<u16, TransportError>,
    pub raw_headers: Result<String, TransportError>,
    pub chunks: Vec<Result<Vec<u8>, TransportError>>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            fail_session: None,
            fail_connect: None,
            fail_send: None,
            status: Ok(200),
            raw_headers: Ok("HTTP/1.1 200 OK\r\n\r\n".to_string()),
            chunks: Vec::new(),
        }
    }
}

impl Script {
    pub fn body(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        self
    }

    pub fn headers(mut self, raw: &str) -> Self {
        self.raw_headers = Ok(raw.to_string());
        self
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    script: Script,
    log: Rc<RefCell<MockLog>>,
}

impl MockTransport {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            log: Rc::default(),
        }
    }

    pub fn log(&self) -> Rc<RefCell<MockLog>> {
        Rc::clone(&self.log)
    }
}

impl Transport for MockTransport {
    type Session = MockSession;

    fn open_session(&self, config: &ClientConfig) -> Result<MockSession, TransportError> {
        self.log.borrow_mut().user_agents.push(config.user_agent.clone());
        if let Some(err) = &self.script.fail_session {
            return Err(err.clone());
        }
        Ok(MockSession {
            script: self.script.clone(),
            log: Rc::clone(&self.log),
        })
    }
}

pub(crate) struct MockSession {
    script: Script,
    log: Rc<RefCell<MockLog>>,
}

impl Session for MockSession {
    type Connection = MockConnection;

    fn connect(&self, host: &str, port: u16, secure: bool) -> Result<MockConnection, TransportError> {
        let mut log = self.log.borrow_mut();
        log.connect_attempts.push((host.to_string(), port, secure));
        if let Some(err) = &self.script.fail_connect {
            return Err(err.clone());
        }
        log.opens += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        Ok(MockConnection {
            host: host.to_string(),
            script: self.script.clone(),
            log: Rc::clone(&self.log),
        })
    }
}

pub(crate) struct MockConnection {
    host: String,
    script: Script,
    log: Rc<RefCell<MockLog>>,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        log.closes += 1;
        log.live -= 1;
    }
}

impl Connection for MockConnection {
    type Request<'c> = MockRequest<'c>;

    fn send_request(&mut self, request: &OutgoingRequest<'_>) -> Result<MockRequest<'_>, TransportError> {
        self.log.borrow_mut().requests.push(SentRequest {
            host: self.host.clone(),
            method: request.method.to_string(),
            target: request.target.to_string(),
            headers: request.headers.to_string(),
            reload: request.reload,
        });
        if let Some(err) = &self.script.fail_send {
            return Err(err.clone());
        }
        let chunks = self.script.chunks.iter().cloned().collect();
        Ok(MockRequest { conn: self, chunks })
    }
}

pub(crate) struct MockRequest<'c> {
    conn: &'c mut MockConnection,
    chunks: VecDeque<Result<Vec<u8>, TransportError>>,
}

impl Drop for MockRequest<'_> {
    fn drop(&mut self) {
        self.conn.log.borrow_mut().request_closes += 1;
    }
}

impl RequestHandle for MockRequest<'_> {
    fn status_code(&mut self) -> Result<u16, TransportError> {
        self.conn.script.status.clone()
    }

    fn raw_headers(&mut self) -> Result<String, TransportError> {
        self.conn.script.raw_headers.clone()
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.chunks.pop_front() {
            None => Ok(0),
            Some(Err(err)) => Err(err),
            Some(Ok(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.chunks.push_front(Ok(bytes.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}
