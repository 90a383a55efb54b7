//! Front controller bootstrap.
//!
//! Resolves the process-wide environment once (install paths, session cookie
//! name, runtime mode, cache tiers) and hands out per-request [`Context`]s, so
//! nothing downstream reads globals.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{CacheKind, Config, ConfigError, Environment};
use crate::core::{generate_request_id, Context, Request, RequestDebugger};

/// Install layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    /// Platform path separator.
    pub separator: char,
    /// Framework installation directory.
    pub base_path: PathBuf,
    /// Filesystem cache directory.
    pub cache_path: PathBuf,
}

/// Fast in-process cache tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastCache {
    pub enabled: bool,
    pub kind: CacheKind,
}

/// Filesystem cache tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilesystemCache {
    pub enabled: bool,
    pub path: PathBuf,
}

/// Two-tier cache strategy handed to the cache subsystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStrategy {
    pub fast: FastCache,
    pub filesystem: FilesystemCache,
}

/// Resolved process-wide framework environment.
#[derive(Clone, Debug)]
pub struct Bootstrap {
    paths: Paths,
    session_name: String,
    environment: Environment,
    cache: CacheStrategy,
    base_url: Arc<str>,
    charset: Arc<str>,
    cookie_ttl: Duration,
    debug: bool,
}

impl Bootstrap {
    /// Resolve paths and cache tiers from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base_path = match &config.framework.base_path {
            Some(path) => path.clone(),
            None => default_base_path()?,
        };
        let cache_path = config
            .cache
            .path
            .clone()
            .unwrap_or_else(|| base_path.join("cache"));

        Ok(Self {
            paths: Paths {
                separator: MAIN_SEPARATOR,
                base_path,
                cache_path: cache_path.clone(),
            },
            session_name: config.framework.session_name.clone(),
            environment: config.framework.environment,
            cache: CacheStrategy {
                fast: FastCache {
                    enabled: config.cache.fast_enabled,
                    kind: config.cache.fast_kind,
                },
                filesystem: FilesystemCache {
                    enabled: config.cache.filesystem_enabled,
                    path: cache_path,
                },
            },
            base_url: Arc::from(config.framework.base_url.as_str()),
            charset: Arc::from(config.framework.charset.as_str()),
            cookie_ttl: config.framework.cookie_ttl,
            debug: config.framework.debug_enabled(),
        })
    }

    /// Prepare the environment for serving requests.
    ///
    /// Creates the filesystem cache directory when that tier is enabled.
    pub fn initialize(&self) -> Result<(), ConfigError> {
        if self.cache.filesystem.enabled {
            let path = &self.cache.filesystem.path;
            std::fs::create_dir_all(path).map_err(|error| ConfigError::Io {
                path: path.display().to_string(),
                error,
            })?;
        }

        info!("Framework initialized:");
        info!("  Environment: {}", self.environment);
        info!("  Base path: {}", self.paths.base_path.display());
        info!("  Session name: {}", self.session_name);
        info!("  Base URL: {}", self.base_url);
        if self.cache.fast.enabled {
            info!("  Fast cache: {:?}", self.cache.fast.kind);
        } else {
            info!("  Fast cache: disabled");
        }
        if self.cache.filesystem.enabled {
            info!(
                "  Filesystem cache: {}",
                self.cache.filesystem.path.display()
            );
        } else {
            info!("  Filesystem cache: disabled");
        }
        if self.debug {
            info!("  Debugger: enabled");
        }

        Ok(())
    }

    /// Per-request context for `request`.
    pub fn context_for(&self, request: &Request) -> Context {
        let request_id = generate_request_id();
        let mut builder = Context::builder()
            .request_id(request_id.clone())
            .base_url(Arc::clone(&self.base_url))
            .charset(Arc::clone(&self.charset))
            .cookie_ttl(self.cookie_ttl);

        if self.debug {
            builder = builder.debugger(RequestDebugger::new(
                request_id,
                request.method().as_str(),
                request.path(),
            ));
        }

        builder.build()
    }

    #[inline]
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    #[inline]
    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    #[inline]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[inline]
    pub fn cache_strategy(&self) -> &CacheStrategy {
        &self.cache
    }

    #[inline]
    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

/// `<cwd>/../caspar/`, canonicalized when the parent exists.
fn default_base_path() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|error| ConfigError::Io {
        path: ".".into(),
        error,
    })?;
    Ok(install_dir_from(&cwd))
}

fn install_dir_from(cwd: &Path) -> PathBuf {
    let parent = cwd.join("..");
    parent
        .canonicalize()
        .unwrap_or(parent)
        .join("caspar")
}
