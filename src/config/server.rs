//! Server configuration.

use std::net::SocketAddr;

use super::parse::{env_bool, env_parse};
use super::ConfigError;

/// Front controller listener configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind (LISTEN_ADDR, default 0.0.0.0:8080).
    pub listen_addr: SocketAddr,
    /// Emit one access line per request (ACCESS_LOG).
    pub access_log: bool,
}

impl ServerConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            access_log: false,
        }
    }

    pub fn with_access_log(mut self, enabled: bool) -> Self {
        self.access_log = enabled;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            listen_addr: env_parse("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            access_log: env_bool("ACCESS_LOG", false),
        })
    }
}
