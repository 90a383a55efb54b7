//! Built-in site served by the `caspar` binary.
//!
//! Routes:
//! - `/` - welcome page (HTML, or JSON/XML via `?format=`), starts a session cookie
//! - `/health` - JSON liveness probe
//! - `/logout` - drops the session cookie and redirects to `/`
//! - anything else - 404 (JSON error body for AJAX/JSON requests)

use std::ops::ControlFlow;

use serde::Serialize;

use crate::core::{
    Context, Decoration, Halted, Request, Response, Transport, DEFAULT_CONTENT_TYPE,
};
use crate::server::Dispatcher;

/// JSON rendition of a page.
#[derive(Serialize)]
struct PageSummary<'a> {
    page: Option<&'a str>,
    title: Option<&'a str>,
    javascripts: &'a [String],
    stylesheets: &'a [String],
}

/// Default dispatcher for the front controller binary.
pub struct Site {
    session_name: String,
}

impl Site {
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
        }
    }

    fn has_session(&self, request: &Request) -> bool {
        request.header("cookie").is_some_and(|cookies| {
            cookies.split(';').any(|pair| {
                pair.trim()
                    .split_once('=')
                    .is_some_and(|(name, _)| name == self.session_name)
            })
        })
    }

    fn index(
        &self,
        request: &Request,
        response: &mut Response,
        out: &mut dyn Transport,
        ctx: &Context,
    ) {
        response.set_page("home");
        response.set_title("Welcome");
        response.set_template("main/index");
        response.add_stylesheet("main.css", false);
        response.add_javascript("main.js", false);
        response.add_javascript("prototype.js", true);
        response.add_feed("/?format=rss", "Site news");

        if !self.has_session(request) {
            response.set_cookie(ctx, out, &self.session_name, &ctx.request_id);
        }

        match request.requested_format().as_ref() {
            "json" => {
                let summary = PageSummary {
                    page: response.page(),
                    title: response.title(),
                    javascripts: response.javascripts().as_slice(),
                    stylesheets: response.stylesheets().as_slice(),
                };
                match serde_json::to_vec(&summary) {
                    Ok(body) => out.write(&body),
                    Err(e) => {
                        response.set_http_status(500);
                        out.write(format!("{{\"error\":\"{}\"}}", e).as_bytes());
                    }
                }
            }
            "xml" | "rss" => {
                let mut body = String::from("<?xml version=\"1.0\"?>\n<rss version=\"2.0\"><channel>");
                body.push_str("<title>Welcome</title>");
                for (url, description) in response.feeds().iter() {
                    body.push_str(&format!(
                        "<item><title>{}</title><link>{}</link></item>",
                        description, url
                    ));
                }
                body.push_str("</channel></rss>");
                out.write(body.as_bytes());
            }
            _ => out.write(render_html(response, "<p>It works.</p>").as_bytes()),
        }
    }

    fn not_found(
        &self,
        request: &Request,
        response: &mut Response,
        out: &mut dyn Transport,
        ctx: &Context,
    ) -> ControlFlow<Halted> {
        if request.is_ajax_call() || request.requested_format() == "json" {
            return ControlFlow::Break(response.ajax_response_text(ctx, out, 404, "Not found"));
        }
        // The body is HTML whatever format was asked for
        response.set_content_type(DEFAULT_CONTENT_TYPE);
        response.set_decoration(Decoration::Default);
        response.set_http_status(404);
        response.set_title("Not found");
        out.write(render_html(response, "<p>The page you requested does not exist.</p>").as_bytes());
        ControlFlow::Continue(())
    }
}

impl Dispatcher for Site {
    fn dispatch(
        &self,
        request: &Request,
        response: &mut Response,
        out: &mut dyn Transport,
        ctx: &Context,
    ) -> ControlFlow<Halted> {
        response.setup_response_content_type(&request.requested_format());

        match request.path() {
            "/" => self.index(request, response, out, ctx),
            "/health" => {
                response.set_content_type("application/json");
                out.write(br#"{"status":"ok"}"#);
            }
            "/logout" => {
                response.delete_cookie(ctx, out, &self.session_name);
                return ControlFlow::Break(response.header_redirect_found(ctx, request, out, "/"));
            }
            _ => return self.not_found(request, response, out, ctx),
        }

        ControlFlow::Continue(())
    }
}

/// Wrap `content` in whatever decoration the response asks for.
fn render_html(response: &Response, content: &str) -> String {
    let full = response.decoration() == Decoration::Default;
    let mut html = String::new();

    if full || response.do_decorate_header() {
        html.push_str("<!DOCTYPE html>\n<html><head>");
        if let Some(title) = response.title() {
            html.push_str(&format!("<title>{}</title>", title));
        }
        if let Some(favicon) = response.favicon_url() {
            html.push_str(&format!("<link rel=\"icon\" href=\"{}\">", favicon));
        }
        for css in response.stylesheets().iter() {
            html.push_str(&format!("<link rel=\"stylesheet\" href=\"/css/{}\">", css));
        }
        for js in response.javascripts().iter() {
            html.push_str(&format!("<script src=\"/js/{}\"></script>", js));
        }
        for (url, description) in response.feeds().iter() {
            html.push_str(&format!(
                "<link rel=\"alternate\" type=\"application/rss+xml\" title=\"{}\" href=\"{}\">",
                description, url
            ));
        }
        html.push_str("</head><body>");
    }

    html.push_str(content);

    if full || response.do_decorate_footer() {
        html.push_str("</body></html>\n");
    }
    html
}
