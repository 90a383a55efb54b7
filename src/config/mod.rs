//! Configuration module for caspar.
//!
//! All settings come from environment variables, mirroring the constants a
//! front controller defines before handing over to the framework.
//!
//! # Example
//!
//! ```rust,ignore
//! use caspar::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Environment: {}", config.framework.environment);
//! ```

mod cache;
mod error;
mod framework;
mod logging;
mod parse;
mod server;

pub use cache::{CacheConfig, CacheKind};
pub use error::ConfigError;
pub use framework::{Environment, FrameworkConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_duration;
pub use server::ServerConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Listener configuration.
    pub server: ServerConfig,
    /// Framework environment.
    pub framework: FrameworkConfig,
    /// Cache strategy.
    pub cache: CacheConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            framework: FrameworkConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }
}
