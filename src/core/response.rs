//! Per-request response accumulator.
//!
//! Controllers mutate a [`Response`] while handling a request; the front
//! controller flushes it through a [`Transport`] when the request ends. The
//! terminal operations ([`Response::ajax_response_text`],
//! [`Response::header_redirect`], [`Response::meta_forward`]) flush on their
//! own and return [`Halted`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tracing::debug;

use super::assets::{AssetList, FeedList};
use super::context::Context;
use super::date::{max_date, HttpDate};
use super::request::Request;
use super::transport::{Cookie, Transport};

/// Default response content type.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Default redirect status (302 Found).
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// How far in the past a deleted cookie expires.
const COOKIE_DELETE_OFFSET: Duration = Duration::from_secs(36_000);

/// Cache-busting header lines; Last-Modified is generated per render.
mod cache_headers {
    pub const EXPIRES: &str = "Expires: Mon, 26 Jul 1997 05:00:00 GMT";
    pub const CACHE_CONTROL: &str = "Cache-Control: no-cache, must-revalidate";
    pub const PRAGMA: &str = "Pragma: no-cache";
}

/// Which structural chrome wraps the page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decoration {
    /// Body only.
    None,
    /// Header template only.
    Header,
    /// Footer template only.
    Footer,
    /// Both standard header and footer.
    #[default]
    Default,
    /// Header and/or footer from explicitly named templates.
    Custom,
}

/// Optional header/footer templates for [`Decoration::Custom`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationOverrides {
    header: Option<String>,
    footer: Option<String>,
}

impl DecorationOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, template: impl Into<String>) -> Self {
        self.header = Some(template.into());
        self
    }

    pub fn footer(mut self, template: impl Into<String>) -> Self {
        self.footer = Some(template.into());
        self
    }
}

/// Marker returned by request-terminal operations.
///
/// Once obtained, output for the request is complete and nothing else may be
/// emitted.
#[must_use = "the request is finished; return this to the front controller"]
#[derive(Debug, PartialEq, Eq)]
pub struct Halted(());

impl Halted {
    #[inline]
    pub(crate) fn new() -> Self {
        Self(())
    }
}

/// Accumulated output state for one request.
///
/// Note: Clone is intentionally not derived; one instance per request.
#[derive(Debug)]
pub struct Response {
    http_status: u16,
    content_type: String,
    template: String,
    decoration: Decoration,
    decor_header: Option<String>,
    decor_footer: Option<String>,
    headers: Vec<String>,
    javascripts: AssetList,
    stylesheets: AssetList,
    feeds: FeedList,
    page: Option<String>,
    title: Option<String>,
    base_title: Option<String>,
    favicon_url: Option<String>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Fresh response with default status, content type and decoration.
    pub fn new() -> Self {
        Self::with_assets(AssetList::new(), AssetList::new())
    }

    /// Fresh response seeded with site-wide javascripts and stylesheets.
    pub fn with_assets(javascripts: AssetList, stylesheets: AssetList) -> Self {
        Self {
            http_status: 200,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            template: String::new(),
            decoration: Decoration::Default,
            decor_header: None,
            decor_footer: None,
            headers: Vec::new(),
            javascripts,
            stylesheets,
            feeds: FeedList::new(),
            page: None,
            title: None,
            base_title: None,
            favicon_url: None,
        }
    }

    // Plain state

    #[inline]
    pub fn set_http_status(&mut self, code: u16) {
        self.http_status = code;
    }

    #[inline]
    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
    }

    #[inline]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Set the page identifier (used to highlight the selected tab).
    pub fn set_page(&mut self, page: impl Into<String>) {
        self.page = Some(page.into());
    }

    #[inline]
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Whether a non-blank title is set.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn set_base_title(&mut self, title: impl Into<String>) {
        self.base_title = Some(title.into());
    }

    #[inline]
    pub fn base_title(&self) -> Option<&str> {
        self.base_title.as_deref()
    }

    pub fn set_favicon_url(&mut self, url: impl Into<String>) {
        self.favicon_url = Some(url.into());
    }

    #[inline]
    pub fn favicon_url(&self) -> Option<&str> {
        self.favicon_url.as_deref()
    }

    // Headers

    /// Queue a raw `Name: value` header line.
    pub fn add_header(&mut self, line: impl Into<String>) {
        self.headers.push(line.into());
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    /// Queued header lines in insertion order.
    #[inline]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    // Assets

    /// Queue a javascript; `important` ones load before everything queued.
    pub fn add_javascript(&mut self, javascript: impl Into<String>, important: bool) {
        if important {
            self.javascripts.push_front(javascript);
        } else {
            self.javascripts.push(javascript);
        }
    }

    /// Queue a stylesheet; `important` ones load before everything queued.
    pub fn add_stylesheet(&mut self, stylesheet: impl Into<String>, important: bool) {
        if important {
            self.stylesheets.push_front(stylesheet);
        } else {
            self.stylesheets.push(stylesheet);
        }
    }

    #[inline]
    pub fn javascripts(&self) -> &AssetList {
        &self.javascripts
    }

    #[inline]
    pub fn stylesheets(&self) -> &AssetList {
        &self.stylesheets
    }

    pub fn add_feed(&mut self, url: impl Into<String>, description: impl Into<String>) {
        self.feeds.insert(url, description);
    }

    #[inline]
    pub fn feeds(&self) -> &FeedList {
        &self.feeds
    }

    // Decoration

    pub fn set_decoration(&mut self, mode: Decoration) {
        self.decoration = mode;
    }

    /// Set the mode and overwrite whichever override templates are given.
    pub fn set_decoration_with(&mut self, mode: Decoration, overrides: DecorationOverrides) {
        self.decoration = mode;
        if let Some(header) = overrides.header {
            self.decor_header = Some(header);
        }
        if let Some(footer) = overrides.footer {
            self.decor_footer = Some(footer);
        }
    }

    #[inline]
    pub fn decoration(&self) -> Decoration {
        self.decoration
    }

    #[inline]
    pub fn header_decoration(&self) -> Option<&str> {
        self.decor_header.as_deref()
    }

    #[inline]
    pub fn footer_decoration(&self) -> Option<&str> {
        self.decor_footer.as_deref()
    }

    pub fn do_decorate_header(&self) -> bool {
        match self.decoration {
            Decoration::Header => true,
            Decoration::Custom => self.decor_header.as_deref().is_some_and(|t| !t.is_empty()),
            _ => false,
        }
    }

    pub fn do_decorate_footer(&self) -> bool {
        match self.decoration {
            Decoration::Footer => true,
            Decoration::Custom => self.decor_footer.as_deref().is_some_and(|t| !t.is_empty()),
            _ => false,
        }
    }

    /// Pick content type and decoration for a requested output format.
    ///
    /// Unknown formats keep the current content type and use full decoration.
    pub fn setup_response_content_type(&mut self, format: &str) {
        self.set_decoration(Decoration::None);
        match format {
            "xml" | "rss" => self.set_content_type("application/xml"),
            "json" => self.set_content_type("application/json"),
            "csv" => self.set_content_type("text/csv"),
            _ => self.set_decoration(Decoration::Default),
        }
    }

    // Output

    /// Drop whatever body output has been buffered so far.
    pub fn clean_buffer(&self, out: &mut dyn Transport) {
        out.discard_buffer();
    }

    /// Emit the status line, cache-busting headers, content type and every
    /// queued header, in that order.
    ///
    /// Each call emits a full block.
    pub fn render_headers(&self, ctx: &Context, out: &mut dyn Transport) {
        out.header(&format!("HTTP/1.0 {}", self.http_status));
        out.header(cache_headers::EXPIRES);
        out.header(&format!("Last-Modified: {}", HttpDate::now()));
        out.header(cache_headers::CACHE_CONTROL);
        out.header(cache_headers::PRAGMA);
        out.header(&format!(
            "Content-Type: {}; charset={}",
            self.content_type, ctx.charset
        ));

        for line in &self.headers {
            out.header(line);
        }
    }

    /// Report an error to an asynchronous caller as `{"error": ...}` and end
    /// the request.
    ///
    /// Buffered output is discarded. With a debugger in the context the body
    /// also carries a `csp-debugger` row.
    pub fn ajax_response_text(
        &mut self,
        ctx: &Context,
        out: &mut dyn Transport,
        code: u16,
        error: impl Into<Value>,
    ) -> Halted {
        out.discard_buffer();
        self.set_content_type("application/json");
        self.set_http_status(code);
        self.render_headers(ctx, out);

        let mut data = json!({ "error": error.into() });
        if let Some(debugger) = ctx.debugger() {
            let row = debugger.page_row(&data);
            data["csp-debugger"] = row;
        }

        debug!(request_id = %ctx.request_id, status = code, "AJAX error response");
        out.write(data.to_string().as_bytes());
        Halted::new()
    }

    /// Send the client to `url` with status `code` and end the request.
    ///
    /// AJAX and JSON-format requests get the status only, without a
    /// `Location` header.
    pub fn header_redirect(
        &mut self,
        ctx: &Context,
        request: &Request,
        out: &mut dyn Transport,
        url: &str,
        code: u16,
    ) -> Halted {
        debug!(request_id = %ctx.request_id, url, status = code, "Running header redirect");
        self.clear_headers();
        self.set_http_status(code);
        if !(request.is_ajax_call() || request.requested_format() == "json") {
            self.add_header(format!("Location: {}", url));
        }
        self.render_headers(ctx, out);
        Halted::new()
    }

    /// [`Response::header_redirect`] with 302 Found.
    pub fn header_redirect_found(
        &mut self,
        ctx: &Context,
        request: &Request,
        out: &mut dyn Transport,
        url: &str,
    ) -> Halted {
        self.header_redirect(ctx, request, out, url, DEFAULT_REDIRECT_STATUS)
    }

    /// Forward via a meta refresh tag in the body and end the request.
    pub fn meta_forward(out: &mut dyn Transport, url: &str) -> Halted {
        out.write(format!("<meta http-equiv=\"refresh\" content=\"0;URL={}\">", url).as_bytes());
        Halted::new()
    }

    // Cookies

    /// Set a cookie for the context's default lifetime.
    pub fn set_cookie(&self, ctx: &Context, out: &mut dyn Transport, key: &str, value: &str) {
        self.set_cookie_for(ctx, out, key, value, ctx.cookie_ttl);
    }

    /// Set a cookie expiring `expiration` from now, scoped to the base URL.
    ///
    /// Expiry clamps to the last date a cookie can carry.
    pub fn set_cookie_for(
        &self,
        ctx: &Context,
        out: &mut dyn Transport,
        key: &str,
        value: &str,
        expiration: Duration,
    ) {
        let latest = max_date();
        let expires = SystemTime::now()
            .checked_add(expiration)
            .map_or(latest, |at| at.min(latest));
        out.set_cookie(Cookie::new(key, value, expires, &*ctx.base_url));
    }

    /// Expire a cookie on the client.
    pub fn delete_cookie(&self, ctx: &Context, out: &mut dyn Transport, key: &str) {
        let expires = SystemTime::now()
            .checked_sub(COOKIE_DELETE_OFFSET)
            .unwrap_or(UNIX_EPOCH);
        out.set_cookie(Cookie::new(key, "", expires, &*ctx.base_url));
    }
}
