//! Response model and the reader that fills it from a request handle.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::HttpError;
use crate::transport::RequestHandle;

/// A fully buffered GET response.
///
/// Header names are kept exactly as received. When a name repeats, the last
/// occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub content: Vec<u8>,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Pulls status, headers and body out of one request handle.
pub struct ResponseReader<'r, R> {
    request: &'r mut R,
    chunk_size: usize,
}

impl<'r, R: RequestHandle> ResponseReader<'r, R> {
    pub fn new(request: &'r mut R, chunk_size: usize) -> Self {
        Self {
            request,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn status_code(&mut self) -> Result<u16, HttpError> {
        self.request.status_code().map_err(|err| {
            log::warn!("status query failed: {err}");
            HttpError::StatusUnavailable(err)
        })
    }

    pub fn headers(&mut self) -> Result<BTreeMap<String, String>, HttpError> {
        let raw = self.request.raw_headers().map_err(|err| {
            log::warn!("header query failed: {err}");
            HttpError::HeadersUnavailable(err)
        })?;
        Ok(parse_headers(&raw))
    }

    /// Read the body until the transport reports a zero-byte read.
    pub fn body(&mut self) -> Result<Vec<u8>, HttpError> {
        let mut content = Vec::new();
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            let n = self.request.read_chunk(&mut buf).map_err(|err| {
                log::warn!("body read failed after {} bytes: {err}", content.len());
                HttpError::ReadFailed(err)
            })?;
            if n == 0 {
                break;
            }
            log::trace!("read {n} body bytes");
            content.extend_from_slice(&buf[..n]);
        }
        Ok(content)
    }

    /// Status, then headers, then body.
    pub fn read(mut self) -> Result<Response, HttpError> {
        let status_code = self.status_code()?;
        let headers = self.headers()?;
        let content = self.body()?;
        Ok(Response {
            status_code,
            headers,
            content,
        })
    }
}

/// Parse a raw header block into a map.
///
/// Each line is split at its first colon; one space after the colon and the
/// line terminator are stripped from the value. Lines without a colon, such
/// as the status line, are skipped.
pub fn parse_headers(raw: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);
        headers.insert(name.to_string(), value.to_string());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    struct Scripted {
        status: Result<u16, TransportError>,
        raw: Result<String, TransportError>,
        chunks: Vec<Result<&'static str, TransportError>>,
        reads: usize,
    }

    impl Scripted {
        fn body(chunks: Vec<Result<&'static str, TransportError>>) -> Self {
            Self {
                status: Ok(200),
                raw: Ok(String::new()),
                chunks,
                reads: 0,
            }
        }
    }

    impl RequestHandle for Scripted {
        fn status_code(&mut self) -> Result<u16, TransportError> {
            self.status.clone()
        }

        fn raw_headers(&mut self) -> Result<String, TransportError> {
            self.raw.clone()
        }

        fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
            let next = self.chunks.get(self.reads).cloned().unwrap_or(Ok(""));
            self.reads += 1;
            let chunk = next?;
            buf[..chunk.len()].copy_from_slice(chunk.as_bytes());
            Ok(chunk.len())
        }
    }

    #[test]
    fn parses_literal_header_block() {
        let headers = parse_headers("Content-Type: text/html\r\nContent-Length: 15\r\n");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["Content-Type"], "text/html");
        assert_eq!(headers["Content-Length"], "15");
    }

    #[test]
    fn status_line_and_blank_lines_are_skipped() {
        let headers = parse_headers("HTTP/1.1 200 OK\r\nX-Test: ok\r\n\r\n");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["X-Test"], "ok");
    }

    #[test]
    fn last_duplicate_wins_and_names_keep_case() {
        let headers = parse_headers("Set-Cookie: a=1\r\nset-cookie: b=2\r\nSet-Cookie: c=3\r\n");
        assert_eq!(headers["Set-Cookie"], "c=3");
        assert_eq!(headers["set-cookie"], "b=2");
    }

    #[test]
    fn value_splits_at_first_colon_only() {
        let headers = parse_headers("Location: http://example.com:8080/\r\nX-Empty:\r\n");
        assert_eq!(headers["Location"], "http://example.com:8080/");
        assert_eq!(headers["X-Empty"], "");
    }

    #[test]
    fn body_concatenates_chunks_until_empty_read() {
        let mut req = Scripted::body(vec![Ok("Hello, "), Ok("World!"), Ok("")]);
        let body = ResponseReader::new(&mut req, 4096).body().unwrap();
        assert_eq!(body, b"Hello, World!");
        assert_eq!(req.reads, 3);
    }

    #[test]
    fn read_failure_mid_stream_is_fatal() {
        let mut req = Scripted::body(vec![
            Ok("partial"),
            Err(TransportError::with_code("connection reset", 104)),
        ]);
        let err = ResponseReader::new(&mut req, 4096).body().unwrap_err();
        assert!(matches!(err, HttpError::ReadFailed(_)));
        assert_eq!(err.code(), Some(104));
    }

    #[test]
    fn status_failure_is_surfaced() {
        let mut req = Scripted::body(vec![]);
        req.status = Err(TransportError::new("no status line"));
        let err = ResponseReader::new(&mut req, 4096).read().unwrap_err();
        assert!(matches!(err, HttpError::StatusUnavailable(_)));
        assert_eq!(req.reads, 0);
    }

    #[test]
    fn header_failure_is_surfaced() {
        let mut req = Scripted::body(vec![]);
        req.raw = Err(TransportError::new("header buffer unavailable"));
        let err = ResponseReader::new(&mut req, 4096).read().unwrap_err();
        assert!(matches!(err, HttpError::HeadersUnavailable(_)));
    }

    #[test]
    fn read_assembles_response() {
        let mut req = Scripted::body(vec![Ok("result")]);
        req.status = Ok(404);
        req.raw = Ok("HTTP/1.1 404 Not Found\r\nX-Test: ok\r\n\r\n".to_string());
        let response = ResponseReader::new(&mut req, 4096).read().unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.header("X-Test"), Some("ok"));
        assert_eq!(response.text(), "result");
        assert!(!response.is_success());
    }
}
