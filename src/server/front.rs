//! Per-request lifecycle: context, accumulator, dispatch, flush.

use std::ops::ControlFlow;

use bytes::Bytes;
use http::StatusCode;
use tracing::{error, info};

use crate::bootstrap::Bootstrap;
use crate::core::{BufferedTransport, Context, Halted, Request, Response, Transport};
use crate::logging::ACCESS_TARGET;

/// Hands a request to controller code.
///
/// Return `ControlFlow::Continue(())` to let the front controller render the
/// accumulated headers, or `ControlFlow::Break` with the [`Halted`] marker
/// from a terminal response operation.
pub trait Dispatcher: Send + Sync + 'static {
    fn dispatch(
        &self,
        request: &Request,
        response: &mut Response,
        out: &mut dyn Transport,
        ctx: &Context,
    ) -> ControlFlow<Halted>;
}

/// Runs one request through a [`Dispatcher`] and produces the wire response.
pub struct FrontController<D> {
    bootstrap: Bootstrap,
    dispatcher: D,
    access_log: bool,
}

impl<D: Dispatcher> FrontController<D> {
    pub fn new(bootstrap: Bootstrap, dispatcher: D) -> Self {
        Self {
            bootstrap,
            dispatcher,
            access_log: false,
        }
    }

    pub fn with_access_log(mut self, enabled: bool) -> Self {
        self.access_log = enabled;
        self
    }

    #[inline]
    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// Handle `request` end to end.
    pub fn handle(&self, request: &Request) -> http::Response<Bytes> {
        let ctx = self.bootstrap.context_for(request);
        let mut response = Response::new();
        let mut out = BufferedTransport::new();

        let flow = self
            .dispatcher
            .dispatch(request, &mut response, &mut out, &ctx);
        if flow.is_continue() {
            response.render_headers(&ctx, &mut out);
        }

        let res = out.into_http().unwrap_or_else(|e| {
            error!(request_id = %ctx.request_id, error = %e, "Failed to flush response");
            internal_error()
        });

        if self.access_log {
            info!(
                target: ACCESS_TARGET,
                request_id = %ctx.request_id,
                method = %request.method(),
                path = request.path(),
                status = res.status().as_u16() as u64,
                bytes = res.body().len() as u64,
                duration_ms = ctx.elapsed_ms(),
            );
        }

        res
    }
}

/// Plain 500 used when accumulated output cannot be flushed.
pub(crate) fn internal_error() -> http::Response<Bytes> {
    plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

pub(crate) fn plain(status: StatusCode, body: &'static str) -> http::Response<Bytes> {
    let mut res = http::Response::new(Bytes::from_static(body.as_bytes()));
    *res.status_mut() = status;
    res.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, Config, FrameworkConfig, LogFormat, LoggingConfig, ServerConfig};

    struct Echo;

    impl Dispatcher for Echo {
        fn dispatch(
            &self,
            request: &Request,
            response: &mut Response,
            out: &mut dyn Transport,
            ctx: &Context,
        ) -> ControlFlow<Halted> {
            match request.path() {
                "/broken" => {
                    response.add_header("not a header line");
                    ControlFlow::Continue(())
                }
                "/away" => ControlFlow::Break(response.header_redirect(
                    ctx,
                    request,
                    out,
                    "/elsewhere",
                    301,
                )),
                _ => {
                    response.add_header("X-Echo: yes");
                    out.write(request.path().as_bytes());
                    ControlFlow::Continue(())
                }
            }
        }
    }

    fn front() -> (tempfile::TempDir, FrontController<Echo>) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            server: ServerConfig::new("127.0.0.1:0".parse().unwrap()),
            framework: FrameworkConfig {
                base_path: Some(dir.path().to_path_buf()),
                ..FrameworkConfig::default()
            },
            cache: CacheConfig::default(),
            logging: LoggingConfig {
                filter: "caspar=info".into(),
                service_name: "caspar".into(),
                format: LogFormat::Json,
            },
        };
        let bootstrap = Bootstrap::from_config(&config).unwrap();
        (dir, FrontController::new(bootstrap, Echo))
    }

    #[test]
    fn test_continue_renders_headers() {
        let (_dir, front) = front();
        let res = front.handle(&Request::get("/hello").unwrap());

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-echo"], "yes");
        assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(res.headers()["pragma"], "no-cache");
        assert_eq!(res.body().as_ref(), b"/hello");
    }

    #[test]
    fn test_break_keeps_terminal_output() {
        let (_dir, front) = front();
        let res = front.handle(&Request::get("/away").unwrap());

        assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(res.headers()["location"], "/elsewhere");
    }

    #[test]
    fn test_malformed_header_becomes_500() {
        let (_dir, front) = front();
        let res = front.handle(&Request::get("/broken").unwrap());
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
