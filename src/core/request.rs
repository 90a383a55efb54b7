//! HTTP request abstraction seen by controllers and the response layer.

use std::borrow::Cow;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, Method, Uri};
use percent_encoding::percent_decode_str;

/// Set by client-side script libraries on asynchronous requests.
static X_REQUESTED_WITH: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-requested-with"));

/// Format assumed when the request does not ask for one.
pub const DEFAULT_FORMAT: &str = "html";

/// HTTP request.
///
/// Note: Clone is intentionally not derived to prevent expensive copies.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Create a new request.
    #[inline]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// GET request for `uri` with no headers, mostly for tests and tools.
    pub fn get(uri: &str) -> Result<Self, http::uri::InvalidUri> {
        Ok(Self::new(
            Method::GET,
            uri.parse()?,
            HeaderMap::new(),
            Bytes::new(),
        ))
    }

    /// Builder-style header insertion.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            http::HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[inline]
    fn header_by_name(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.header_by_name(&header::CONTENT_TYPE)
    }

    /// Whether the request was issued by client-side script
    /// (`X-Requested-With: XMLHttpRequest`).
    pub fn is_ajax_call(&self) -> bool {
        self.header_by_name(&X_REQUESTED_WITH)
            .is_some_and(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
    }

    /// First value of query parameter `name`, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<Cow<'_, str>> {
        self.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key) == name).then(|| decode(value))
        })
    }

    /// Format requested through the `format` query parameter, `html` otherwise.
    pub fn requested_format(&self) -> Cow<'_, str> {
        self.query_param("format")
            .filter(|f| !f.is_empty())
            .unwrap_or(Cow::Borrowed(DEFAULT_FORMAT))
    }
}

/// Decode a query component, treating `+` as space.
fn decode(s: &str) -> Cow<'_, str> {
    if s.contains('+') {
        let replaced = s.replace('+', " ");
        Cow::Owned(percent_decode_str(&replaced).decode_utf8_lossy().into_owned())
    } else {
        percent_decode_str(s).decode_utf8_lossy()
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Bytes>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
        }
    }
}
