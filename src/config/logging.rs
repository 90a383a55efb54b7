//! Logging configuration.

use super::parse::env_or;
use super::ConfigError;

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable tracing-subscriber output.
    Text,
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Filter directive (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name reported in every JSON line.
    pub service_name: String,
    /// Line format (LOG_FORMAT: json | text).
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// LOG_LEVEL takes a bare level and scopes it to this crate; RUST_LOG takes
    /// full filter syntax such as `caspar=debug,hyper=warn`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_or("LOG_FORMAT", "json").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    message: format!("'{}', expected json or text", other),
                })
            }
        };

        Ok(Self {
            filter: resolve_filter(
                std::env::var("LOG_LEVEL").ok().as_deref(),
                std::env::var("RUST_LOG").ok().as_deref(),
            ),
            service_name: env_or("SERVICE_NAME", "caspar"),
            format,
        })
    }
}

/// LOG_LEVEL > RUST_LOG > `caspar=info`.
fn resolve_filter(log_level: Option<&str>, rust_log: Option<&str>) -> String {
    if let Some(level) = log_level {
        let level = level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => return format!("caspar={}", level),
            // Logging is not up yet
            _ => eprintln!(
                "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                level
            ),
        }
    }

    rust_log
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "caspar=info".to_string())
}
