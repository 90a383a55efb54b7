//! caspar - response layer and front controller for a small MVC framework.
//!
//! Controllers accumulate output on a per-request [`core::Response`]
//! (status, content type, headers, cookies, template, decoration, scripts,
//! stylesheets, feeds). The front controller flushes it through a
//! [`core::Transport`] when the request ends.
//!
//! # Architecture
//!
//! - [`config`] - environment-driven configuration
//! - [`bootstrap`] - process-wide setup (paths, session name, cache tiers)
//!   and per-request [`core::Context`] creation
//! - [`core`] - the response accumulator and its collaborators
//! - [`server`] - hyper-based front controller and the [`server::Dispatcher`] seam
//! - [`app`] - the built-in site served by the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use caspar::bootstrap::Bootstrap;
//! use caspar::config::Config;
//! use caspar::server::Server;
//!
//! let config = Config::from_env()?;
//! let bootstrap = Bootstrap::from_config(&config)?;
//! bootstrap.initialize()?;
//! let site = caspar::app::Site::new(bootstrap.session_name());
//! let server = Server::bind(&config.server, bootstrap, site).await?;
//! server.run().await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty when built outside a checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod core;
pub mod logging;
pub mod server;

// Re-exports for convenience
pub use bootstrap::Bootstrap;
pub use config::Config;
pub use crate::core::{Context, Response};
pub use server::{Dispatcher, Server};
