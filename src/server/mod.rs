//! HTTP front controller server.
//!
//! Accepts HTTP/1.1 connections, collects each request body, and runs the
//! request through a [`FrontController`].
//!
//! # Example
//!
//! ```rust,ignore
//! use caspar::server::Server;
//!
//! let server = Server::bind(&config.server, bootstrap, Site::new("CASPAR")).await?;
//! server.run().await?;
//! ```

mod front;

pub use front::{Dispatcher, FrontController};

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming as IncomingBody;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::bootstrap::Bootstrap;
use crate::config::ServerConfig;
use crate::core::{Request, Result};

/// Bound front controller server.
pub struct Server<D> {
    listener: TcpListener,
    front: Arc<FrontController<D>>,
}

impl<D: Dispatcher> Server<D> {
    /// Bind the listener. Port 0 picks an ephemeral port.
    pub async fn bind(config: &ServerConfig, bootstrap: Bootstrap, dispatcher: D) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr).await?;
        let front = FrontController::new(bootstrap, dispatcher).with_access_log(config.access_log);

        Ok(Self {
            listener,
            front: Arc::new(front),
        })
    }

    /// Address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the task is dropped.
    ///
    /// Accept errors are logged and skipped.
    pub async fn run(self) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);
        serve(self.listener, self.front).await;
        Ok(())
    }
}

/// Source of accepted TCP connections.
trait Accept {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl Accept for TcpListener {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }
}

async fn serve<A: Accept, D: Dispatcher>(listener: A, front: Arc<FrontController<D>>) {
    loop {
        let (stream, remote_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Accept error: {}", e);
                continue;
            }
        };

        let _ = stream.set_nodelay(true);
        let front = Arc::clone(&front);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let front = Arc::clone(&front);
                async move { handle_request(front, req).await }
            });

            let io = TokioIo::new(stream);
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Connection error from {}: {:?}", remote_addr, err);
            }
        });
    }
}

async fn handle_request<D: Dispatcher>(
    front: Arc<FrontController<D>>,
    req: hyper::Request<IncomingBody>,
) -> std::result::Result<hyper::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!("Failed to read request body: {:?}", e);
            return Ok(front::plain(StatusCode::BAD_REQUEST, "Bad Request").map(Full::new));
        }
    };

    let request = Request::from(http::Request::from_parts(parts, body));
    Ok(front.handle(&request).map(Full::new))
}
