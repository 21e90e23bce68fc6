//! Reader for saved HTTP exchanges

use crate::headers::Headers;
use gleaner_core::Rewind;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Header carrying the URL the content was fetched from
pub const URL_HEADER: &str = "X-Request-URL";

/// Errors raised while reading a saved exchange.
///
/// These are construction-time failures: a response that cannot be
/// framed never becomes an input, so extractors only ever see
/// well-formed ones.
#[derive(Error, Debug)]
pub enum ResponseError {
    /// Reading the underlying source failed
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// The exchange is not framed as status line, headers, blank line
    #[error("Malformed exchange: {0}")]
    Malformed(String),
}

/// A saved HTTP exchange: status line, header block, body.
///
/// This is the rewindable input the dispatch layer runs against. The
/// handle is cheap to clone. Clones share the buffer *and* the body
/// read cursor, so a pipeline holding a clone and a `Chained` rewinding
/// the original observe the same position.
#[derive(Debug, Clone)]
pub struct Response {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    status: u16,
    reason: String,
    headers: Headers,
    url: Option<Url>,
    data: Vec<u8>,
    body_start: usize,
    // single logical reader at a time, so ordering is not load-bearing
    cursor: AtomicUsize,
}

impl Response {
    /// Read and parse a saved exchange from any reader
    pub fn from_read(mut reader: impl Read) -> Result<Self, ResponseError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Parse a saved exchange already held in memory.
    ///
    /// The expected framing is an HTTP status line, a header block, and
    /// a blank line; everything after the blank line is the body. Both
    /// `\r\n` and bare `\n` line endings are accepted.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ResponseError> {
        let (line, mut pos) = next_line(&data, 0)
            .ok_or_else(|| ResponseError::Malformed("empty input".to_string()))?;
        let (status, reason) = parse_status_line(line)?;

        let mut headers = Headers::default();
        loop {
            let (raw, next) = next_line(&data, pos).ok_or_else(|| {
                ResponseError::Malformed("missing blank line after header block".to_string())
            })?;
            pos = next;
            if raw.is_empty() {
                break;
            }
            let text = std::str::from_utf8(raw).map_err(|_| {
                ResponseError::Malformed("header line is not valid UTF-8".to_string())
            })?;
            let (name, value) = text.split_once(':').ok_or_else(|| {
                ResponseError::Malformed(format!("header line without ':': {}", text))
            })?;
            headers.push(name.trim().to_string(), value.trim().to_string());
        }
        let body_start = pos;

        let url = match headers.get(URL_HEADER) {
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("ignoring unparseable {} header '{}': {}", URL_HEADER, raw, e);
                    None
                }
            },
            None => None,
        };

        debug!(
            "parsed response: status {}, {} headers, {} body bytes",
            status,
            headers.len(),
            data.len() - body_start
        );

        Ok(Self {
            inner: Arc::new(Inner {
                status,
                reason,
                headers,
                url,
                data,
                body_start,
                cursor: AtomicUsize::new(body_start),
            }),
        })
    }

    /// HTTP status code from the status line
    pub fn status(&self) -> u16 {
        self.inner.status
    }

    /// Reason phrase from the status line, possibly empty
    pub fn reason(&self) -> &str {
        &self.inner.reason
    }

    /// The parsed header block
    pub fn headers(&self) -> &Headers {
        &self.inner.headers
    }

    /// First value for a header name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name)
    }

    /// The URL the content was fetched from, when the exchange carries
    /// a parseable [`URL_HEADER`]
    pub fn url(&self) -> Option<&Url> {
        self.inner.url.as_ref()
    }

    /// The URL as a string slice
    pub fn url_str(&self) -> Option<&str> {
        self.inner.url.as_ref().map(Url::as_str)
    }

    /// The whole body, regardless of the read cursor
    pub fn body(&self) -> &[u8] {
        &self.inner.data[self.inner.body_start..]
    }

    /// The whole body decoded as UTF-8, with invalid sequences replaced
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.body())
    }

    /// Read the next line of the body, advancing the read cursor.
    ///
    /// The trailing newline is kept, matching what a line-oriented
    /// reader would hand back. Returns `None` once the body is
    /// exhausted; rewinding makes the body readable again.
    pub fn read_line(&self) -> Option<String> {
        let data = &self.inner.data;
        let start = self.inner.cursor.load(Ordering::Relaxed);
        if start >= data.len() {
            return None;
        }
        let end = match data[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => start + offset + 1,
            None => data.len(),
        };
        self.inner.cursor.store(end, Ordering::Relaxed);
        Some(String::from_utf8_lossy(&data[start..end]).into_owned())
    }
}

impl Rewind for Response {
    fn rewind(&self) {
        self.inner
            .cursor
            .store(self.inner.body_start, Ordering::Relaxed);
    }
}

/// Labeller for `label`: the response's URL, when it has one.
///
/// An exchange without a usable [`URL_HEADER`] produces no label, so a
/// pipeline labeled this way silently skips such inputs.
pub fn url_label(response: &Response) -> Option<String> {
    response.url_str().map(str::to_owned)
}

fn next_line(data: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    if pos >= data.len() {
        return None;
    }
    let (line, next) = match data[pos..].iter().position(|&b| b == b'\n') {
        Some(offset) => (&data[pos..pos + offset], pos + offset + 1),
        None => (&data[pos..], data.len()),
    };
    // tolerate \r\n endings
    let line = match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    };
    Some((line, next))
}

fn parse_status_line(line: &[u8]) -> Result<(u16, String), ResponseError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| ResponseError::Malformed("status line is not valid UTF-8".to_string()))?;
    let mut parts = text.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(ResponseError::Malformed(format!(
            "not a status line: {}",
            text
        )));
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| ResponseError::Malformed(format!("bad status code in: {}", text)))?;
    let reason = parts.next().unwrap_or("").to_string();
    Ok((status, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXCHANGE: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: text/html\r\n\
X-Request-URL: http://example.net/page\r\n\
\r\n\
first line\nsecond line\n";

    fn response() -> Response {
        Response::from_bytes(EXCHANGE.to_vec()).unwrap()
    }

    #[test]
    fn test_parses_status_line() {
        let response = response();
        assert_eq!(response.status(), 200);
        assert_eq!(response.reason(), "OK");
    }

    #[test]
    fn test_parses_headers() {
        let response = response();
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.headers().len(), 2);
    }

    #[test]
    fn test_parses_url_header() {
        let response = response();
        assert_eq!(response.url_str(), Some("http://example.net/page"));
        assert_eq!(response.url().unwrap().host_str(), Some("example.net"));
    }

    #[test]
    fn test_missing_url_header() {
        let response = Response::from_bytes(b"HTTP/1.1 200 OK\r\n\r\nbody".to_vec()).unwrap();
        assert_eq!(response.url(), None.as_ref());
        assert_eq!(url_label(&response), None);
    }

    #[test]
    fn test_unparseable_url_header_is_dropped() {
        let data = b"HTTP/1.1 200 OK\r\nX-Request-URL: not a url\r\n\r\n".to_vec();
        let response = Response::from_bytes(data).unwrap();
        assert_eq!(response.url(), None.as_ref());
    }

    #[test]
    fn test_body_excludes_head() {
        let response = response();
        assert_eq!(response.body(), b"first line\nsecond line\n");
        assert_eq!(response.body_str(), "first line\nsecond line\n");
    }

    #[test]
    fn test_read_line_keeps_newline_and_advances() {
        let response = response();
        assert_eq!(response.read_line().as_deref(), Some("first line\n"));
        assert_eq!(response.read_line().as_deref(), Some("second line\n"));
        assert_eq!(response.read_line(), None);
    }

    #[test]
    fn test_rewind_restores_body_start() {
        let response = response();
        assert_eq!(response.read_line().as_deref(), Some("first line\n"));
        response.rewind();
        assert_eq!(response.read_line().as_deref(), Some("first line\n"));
    }

    #[test]
    fn test_clones_share_the_cursor() {
        let response = response();
        let other = response.clone();
        assert_eq!(response.read_line().as_deref(), Some("first line\n"));
        assert_eq!(other.read_line().as_deref(), Some("second line\n"));
    }

    #[test]
    fn test_bare_newline_framing() {
        let data = b"HTTP/1.1 404 Not Found\nX-Request-URL: http://example.net/\n\ngone\n".to_vec();
        let response = Response::from_bytes(data).unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.reason(), "Not Found");
        assert_eq!(response.body(), b"gone\n");
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            Response::from_bytes(Vec::new()),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_blank_line_is_malformed() {
        let data = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n".to_vec();
        assert!(matches!(
            Response::from_bytes(data),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_garbage_status_line_is_malformed() {
        assert!(matches!(
            Response::from_bytes(b"<html></html>".to_vec()),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_status_line_without_reason() {
        let response = Response::from_bytes(b"HTTP/1.1 204\r\n\r\n".to_vec()).unwrap();
        assert_eq!(response.status(), 204);
        assert_eq!(response.reason(), "");
    }
}
