//! Core types for per-request output handling.
//!
//! - [`Response`] - accumulated output state (status, headers, assets, decoration)
//! - [`Transport`] - where rendered headers, cookies and body bytes go
//! - [`Request`] - the incoming request as seen by controllers
//! - [`Context`] - explicit per-request collaborators (charset, cookie path, debugger)
//! - [`Error`] - failures when converting output into a wire response
//!
//! # Example
//!
//! ```rust,ignore
//! use caspar::core::{BufferedTransport, Context, Response};
//!
//! let ctx = Context::builder().charset("utf-8").build();
//! let mut res = Response::new();
//! res.set_http_status(404);
//! res.set_content_type("application/json");
//!
//! let mut out = BufferedTransport::new();
//! res.render_headers(&ctx, &mut out);
//! let http_res = out.into_http()?;
//! ```

mod assets;
mod context;
mod date;
mod error;
mod request;
mod response;
mod transport;

pub use assets::{AssetList, FeedList};
pub use context::{
    generate_request_id, Context, ContextBuilder, Debugger, RequestDebugger, DEFAULT_COOKIE_TTL,
};
pub use date::{max_date, HttpDate, Iso8601Timestamp, MAX_DATE_SECS};
pub use error::{Error, Result};
pub use request::{Request, DEFAULT_FORMAT};
pub use response::{
    Decoration, DecorationOverrides, Halted, Response, DEFAULT_CONTENT_TYPE,
    DEFAULT_REDIRECT_STATUS,
};
pub use transport::{BufferedTransport, Cookie, Transport};
