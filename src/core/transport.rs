//! Output transport: where rendered headers, cookies and body bytes go.

use std::time::SystemTime;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::date::HttpDate;
use super::error::{Error, Result};

/// Characters left unescaped in cookie values (RFC 3986 unreserved).
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Sink for everything a response emits.
///
/// Implementations decide how header lines reach the client. Header lines are
/// passed verbatim (`HTTP/1.0 200`, `Name: value`), in emission order.
pub trait Transport {
    /// Emit a raw header line.
    fn header(&mut self, line: &str);

    /// Emit a cookie.
    fn set_cookie(&mut self, cookie: Cookie);

    /// Append bytes to the buffered body.
    fn write(&mut self, bytes: &[u8]);

    /// Drop any buffered body output.
    fn discard_buffer(&mut self);
}

/// A cookie scoped to a path with an absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: SystemTime,
    pub path: String,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        expires: SystemTime,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires,
            path: path.into(),
        }
    }

    /// Seconds from `now` until expiry, 0 when already expired.
    pub fn max_age_from(&self, now: SystemTime) -> u64 {
        self.expires
            .duration_since(now)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// `Set-Cookie` header value relative to `now`.
    pub fn header_value_at(&self, now: SystemTime) -> String {
        let mut value = format!(
            "{}={}; expires={}; Max-Age={}",
            self.name,
            utf8_percent_encode(&self.value, COOKIE_VALUE),
            HttpDate::from_system_time(self.expires),
            self.max_age_from(now)
        );
        if !self.path.is_empty() {
            value.push_str("; path=");
            value.push_str(&self.path);
        }
        value
    }

    /// `Set-Cookie` header value relative to the current time.
    #[inline]
    pub fn header_value(&self) -> String {
        self.header_value_at(SystemTime::now())
    }
}

/// In-memory transport that can be turned into an HTTP response.
///
/// Header lines are recorded exactly as emitted. When converted, a later
/// `Name:` line replaces an earlier one with the same name, except
/// `Set-Cookie` lines which accumulate; the last status line wins.
#[derive(Debug, Default)]
pub struct BufferedTransport {
    lines: Vec<String>,
    body: Vec<u8>,
}

impl BufferedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All emitted header lines in order.
    #[inline]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Buffered body bytes.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Status code of the last emitted status line, if any parses.
    pub fn status(&self) -> Option<u16> {
        self.lines
            .iter()
            .rev()
            .find_map(|line| parse_status_line(line).and_then(|code| code.ok()))
    }

    /// Value of the last emitted header with `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    /// Convert into a wire response.
    pub fn into_http(self) -> Result<http::Response<Bytes>> {
        let mut status = StatusCode::OK;
        let mut headers = HeaderMap::with_capacity(self.lines.len());

        for line in &self.lines {
            if let Some(code) = parse_status_line(line) {
                let code = code.map_err(|_| Error::InvalidHeader(line.clone()))?;
                status = StatusCode::from_u16(code).map_err(|_| Error::InvalidStatus(code))?;
                continue;
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::InvalidHeader(line.clone()))?;
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|_| Error::InvalidHeader(line.clone()))?;
            let value = HeaderValue::from_str(value.trim())
                .map_err(|_| Error::InvalidHeader(line.clone()))?;

            if name == header::SET_COOKIE {
                headers.append(name, value);
            } else {
                headers.insert(name, value);
            }
        }

        let mut res = http::Response::new(Bytes::from(self.body));
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        Ok(res)
    }
}

impl Transport for BufferedTransport {
    fn header(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn set_cookie(&mut self, cookie: Cookie) {
        self.lines
            .push(format!("Set-Cookie: {}", cookie.header_value()));
    }

    fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    fn discard_buffer(&mut self) {
        self.body.clear();
    }
}

/// `Some` if the line is a status line (`HTTP/x.y CODE ...`).
fn parse_status_line(line: &str) -> Option<std::result::Result<u16, std::num::ParseIntError>> {
    let rest = line.strip_prefix("HTTP/")?;
    let code = rest.split_whitespace().nth(1).unwrap_or("");
    Some(code.parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_cookie_header_value() {
        let now = UNIX_EPOCH + Duration::from_secs(1_709_210_096);
        let cookie = Cookie::new(
            "CASPAR",
            "a b/c",
            now + Duration::from_secs(864_000),
            "/app/",
        );

        assert_eq!(
            cookie.header_value_at(now),
            "CASPAR=a%20b%2Fc; expires=Sun, 10 Mar 2024 12:34:56 GMT; Max-Age=864000; path=/app/"
        );
    }

    #[test]
    fn test_expired_cookie_has_zero_max_age() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000_000);
        let cookie = Cookie::new("k", "", now - Duration::from_secs(36_000), "/");
        assert_eq!(cookie.max_age_from(now), 0);
        assert!(cookie.header_value_at(now).contains("Max-Age=0"));
    }

    #[test]
    fn test_buffered_records_lines_in_order() {
        let mut t = BufferedTransport::new();
        t.header("HTTP/1.0 201");
        t.header("X-One: 1");
        t.header("X-Two: 2");

        assert_eq!(t.lines(), &["HTTP/1.0 201", "X-One: 1", "X-Two: 2"]);
        assert_eq!(t.status(), Some(201));
        assert_eq!(t.header_value("x-two"), Some("2"));
    }

    #[test]
    fn test_discard_buffer() {
        let mut t = BufferedTransport::new();
        t.write(b"partial output");
        t.discard_buffer();
        t.write(b"{}");
        assert_eq!(t.body(), b"{}");
    }

    #[test]
    fn test_into_http_replaces_and_appends() {
        let mut t = BufferedTransport::new();
        t.header("HTTP/1.0 404");
        t.header("Cache-Control: no-cache");
        t.header("Cache-Control: max-age=60");
        t.set_cookie(Cookie::new("a", "1", SystemTime::now(), "/"));
        t.set_cookie(Cookie::new("b", "2", SystemTime::now(), "/"));
        t.write(b"body");

        let res = t.into_http().unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers().get("cache-control").unwrap(), "max-age=60");
        assert_eq!(res.headers().get_all("set-cookie").iter().count(), 2);
        assert_eq!(res.body().as_ref(), b"body");
    }

    #[test]
    fn test_into_http_rejects_malformed_line() {
        let mut t = BufferedTransport::new();
        t.header("not a header");
        assert!(matches!(t.into_http(), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_into_http_rejects_bad_status() {
        let mut t = BufferedTransport::new();
        t.header("HTTP/1.0 42");
        assert!(matches!(t.into_http(), Err(Error::InvalidStatus(42))));
    }
}
