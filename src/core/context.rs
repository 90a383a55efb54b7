//! Per-request context passed explicitly to the response layer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

/// Default cookie lifetime (ten days).
pub const DEFAULT_COOKIE_TTL: Duration = Duration::from_secs(864_000);

/// Debug collaborator consulted when reporting AJAX errors.
pub trait Debugger: Send + Sync {
    /// Diagnostic row describing the current request, given the JSON output
    /// about to be sent.
    fn page_row(&self, output: &Value) -> Value;
}

/// Default debugger: request identity, timing and the pending JSON output.
#[derive(Debug, Clone)]
pub struct RequestDebugger {
    request_id: String,
    method: String,
    path: String,
    started_at: Instant,
}

impl RequestDebugger {
    pub fn new(
        request_id: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            path: path.into(),
            started_at: Instant::now(),
        }
    }
}

impl Debugger for RequestDebugger {
    fn page_row(&self, output: &Value) -> Value {
        json!({
            "id": self.request_id,
            "method": self.method,
            "path": self.path,
            "elapsed_ms": self.started_at.elapsed().as_secs_f64() * 1000.0,
            "output": output,
        })
    }
}

/// Request context shared by controllers and the response layer.
///
/// Carries what the response needs from the rest of the framework: the cookie
/// base path, the i18n charset, and an optional debugger.
pub struct Context {
    /// Short request ID for logging.
    pub request_id: String,

    /// Request start time.
    pub started_at: Instant,

    /// Base URL path cookies are scoped to.
    pub base_url: Arc<str>,

    /// Charset appended to the Content-Type header.
    pub charset: Arc<str>,

    /// Lifetime of cookies set without an explicit expiration.
    pub cookie_ttl: Duration,

    debugger: Option<Arc<dyn Debugger>>,
}

impl Context {
    /// Create a context builder.
    #[inline]
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Debugger, when debug mode is on.
    #[inline]
    pub fn debugger(&self) -> Option<&dyn Debugger> {
        self.debugger.as_deref()
    }

    #[inline]
    pub fn is_debug(&self) -> bool {
        self.debugger.is_some()
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("base_url", &self.base_url)
            .field("charset", &self.charset)
            .field("cookie_ttl", &self.cookie_ttl)
            .field("debug", &self.is_debug())
            .finish()
    }
}

/// Short request ID: first 12 hex chars of a v4 UUID.
pub fn generate_request_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Builder for [`Context`].
#[derive(Clone)]
pub struct ContextBuilder {
    request_id: Option<String>,
    base_url: Arc<str>,
    charset: Arc<str>,
    cookie_ttl: Duration,
    debugger: Option<Arc<dyn Debugger>>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            request_id: None,
            base_url: Arc::from("/"),
            charset: Arc::from("utf-8"),
            cookie_ttl: DEFAULT_COOKIE_TTL,
            debugger: None,
        }
    }

    #[inline]
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[inline]
    pub fn base_url(mut self, base_url: impl Into<Arc<str>>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[inline]
    pub fn charset(mut self, charset: impl Into<Arc<str>>) -> Self {
        self.charset = charset.into();
        self
    }

    #[inline]
    pub fn cookie_ttl(mut self, ttl: Duration) -> Self {
        self.cookie_ttl = ttl;
        self
    }

    #[inline]
    pub fn debugger(mut self, debugger: impl Debugger + 'static) -> Self {
        self.debugger = Some(Arc::new(debugger));
        self
    }

    /// Build the context.
    pub fn build(self) -> Context {
        Context {
            request_id: self.request_id.unwrap_or_else(generate_request_id),
            started_at: Instant::now(),
            base_url: self.base_url,
            charset: self.charset,
            cookie_ttl: self.cookie_ttl,
            debugger: self.debugger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_defaults() {
        let ctx = Context::builder().build();

        assert_eq!(&*ctx.base_url, "/");
        assert_eq!(&*ctx.charset, "utf-8");
        assert_eq!(ctx.cookie_ttl, DEFAULT_COOKIE_TTL);
        assert_eq!(ctx.request_id.len(), 12);
        assert!(!ctx.is_debug());
        assert!(ctx.debugger().is_none());
    }

    #[test]
    fn test_context_builder() {
        let ctx = Context::builder()
            .request_id("abc123")
            .base_url("/caspar/")
            .charset("iso-8859-1")
            .cookie_ttl(Duration::from_secs(60))
            .debugger(RequestDebugger::new("abc123", "GET", "/"))
            .build();

        assert_eq!(ctx.request_id, "abc123");
        assert_eq!(&*ctx.base_url, "/caspar/");
        assert_eq!(&*ctx.charset, "iso-8859-1");
        assert_eq!(ctx.cookie_ttl, Duration::from_secs(60));
        assert!(ctx.is_debug());
    }

    #[test]
    fn test_request_debugger_row() {
        let dbg = RequestDebugger::new("r1", "POST", "/login");
        let row = dbg.page_row(&json!({"error": "denied"}));

        assert_eq!(row["id"], "r1");
        assert_eq!(row["method"], "POST");
        assert_eq!(row["path"], "/login");
        assert_eq!(row["output"]["error"], "denied");
        assert!(row["elapsed_ms"].as_f64().unwrap() >= 0.0);
    }

    #[test]
    fn test_generate_request_id() {
        let id1 = generate_request_id();
        let id2 = generate_request_id();
        assert_eq!(id1.len(), 12);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_context_elapsed() {
        let ctx = Context::builder().build();
        std::thread::sleep(Duration::from_millis(5));
        assert!(ctx.elapsed_ms() >= 5.0);
    }
}
