//! Framework environment: install path, session, runtime mode, i18n, cookies.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::parse::{env_bool, env_duration, env_opt, env_or};
use super::ConfigError;
use crate::core::MAX_DATE_SECS;

/// Runtime environment the framework runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Prod,
    Dev,
    Test,
}

impl Environment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Dev => "dev",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prod" | "production" => Ok(Environment::Prod),
            "dev" | "development" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            other => Err(format!("unknown environment '{}', expected prod, dev or test", other)),
        }
    }
}

/// Framework-level settings loaded from `CASPAR_*` variables.
#[derive(Clone, Debug)]
pub struct FrameworkConfig {
    /// Installation path override (CASPAR_PATH).
    pub base_path: Option<PathBuf>,
    /// Session cookie name (CASPAR_SESSION_NAME).
    pub session_name: String,
    /// Runtime environment (CASPAR_ENV).
    pub environment: Environment,
    /// URL path cookies are scoped to (CASPAR_BASE_URL).
    pub base_url: String,
    /// Response charset (CASPAR_CHARSET).
    pub charset: String,
    /// Force the debug collaborator on (CASPAR_DEBUG).
    pub debug: bool,
    /// Default cookie lifetime (CASPAR_COOKIE_TTL).
    pub cookie_ttl: Duration,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            session_name: "CASPAR".to_string(),
            environment: Environment::Prod,
            base_url: "/".to_string(),
            charset: "utf-8".to_string(),
            debug: false,
            cookie_ttl: Duration::from_secs(864_000),
        }
    }
}

impl FrameworkConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env_or("CASPAR_ENV", "prod")
            .parse::<Environment>()
            .map_err(|message| ConfigError::Invalid {
                key: "CASPAR_ENV".into(),
                message,
            })?;

        let cookie_ttl = env_duration("CASPAR_COOKIE_TTL", "10d")?.ok_or_else(|| {
            ConfigError::Invalid {
                key: "CASPAR_COOKIE_TTL".into(),
                message: "cookie lifetime cannot be off".into(),
            }
        })?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        check_cookie_ttl(cookie_ttl, now)?;

        let mut base_url = env_or("CASPAR_BASE_URL", "/");
        if !base_url.starts_with('/') {
            base_url.insert(0, '/');
        }

        Ok(Self {
            base_path: env_opt("CASPAR_PATH").map(PathBuf::from),
            session_name: env_or("CASPAR_SESSION_NAME", "CASPAR"),
            environment,
            base_url,
            charset: env_or("CASPAR_CHARSET", "utf-8"),
            debug: env_bool("CASPAR_DEBUG", false),
            cookie_ttl,
        })
    }

    /// Debug collaborator is active when forced on or in dev mode.
    #[inline]
    pub fn debug_enabled(&self) -> bool {
        self.debug || self.environment == Environment::Dev
    }
}

/// Cookies set `ttl` after `now` must expire by the end of year 9999.
fn check_cookie_ttl(ttl: Duration, now: Duration) -> Result<(), ConfigError> {
    let headroom = MAX_DATE_SECS.saturating_sub(now.as_secs());
    if ttl.as_secs() > headroom {
        return Err(ConfigError::Invalid {
            key: "CASPAR_COOKIE_TTL".into(),
            message: format!(
                "cookie lifetime of {}s reaches past year 9999 (at most {}s)",
                ttl.as_secs(),
                headroom
            ),
        });
    }
    Ok(())
}
