//! Two-tier cache strategy configuration.

use std::path::PathBuf;
use std::str::FromStr;

use super::parse::{env_bool, env_opt, env_or};
use super::ConfigError;

/// Backend for the fast in-process tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheKind {
    /// Shared-memory opcode-style user cache.
    Apc,
    /// Plain process memory.
    Memory,
}

impl FromStr for CacheKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apc" => Ok(CacheKind::Apc),
            "memory" => Ok(CacheKind::Memory),
            other => Err(format!("unknown cache type '{}', expected apc or memory", other)),
        }
    }
}

/// Cache tiers as requested by the environment.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Fast tier on/off (CASPAR_CACHE_FAST, default off).
    pub fast_enabled: bool,
    /// Fast tier backend (CASPAR_CACHE_FAST_TYPE, default apc).
    pub fast_kind: CacheKind,
    /// Filesystem tier on/off (CASPAR_CACHE_FILESYSTEM, default on).
    pub filesystem_enabled: bool,
    /// Filesystem tier directory override (CASPAR_CACHE_PATH).
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fast_enabled: false,
            fast_kind: CacheKind::Apc,
            filesystem_enabled: true,
            path: None,
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let fast_kind = env_or("CASPAR_CACHE_FAST_TYPE", "apc")
            .parse::<CacheKind>()
            .map_err(|message| ConfigError::Invalid {
                key: "CASPAR_CACHE_FAST_TYPE".into(),
                message,
            })?;

        Ok(Self {
            fast_enabled: env_bool("CASPAR_CACHE_FAST", false),
            fast_kind,
            filesystem_enabled: env_bool("CASPAR_CACHE_FILESYSTEM", true),
            path: env_opt("CASPAR_CACHE_PATH").map(PathBuf::from),
        })
    }
}
