//! Transfer configuration loaded from `~/.config/rangefetch/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::transport::Timeouts;

/// SHA-256 of the reference dataset served at the default `server_url`.
pub const DEFAULT_EXPECTED_SHA256: &str =
    "e729338af8fa24513523721e86f84fc1dd18131a0dd91a4b2c995bca5eccfeee";

/// Backoff parameters for `RetryMode::Backoff` (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// How a chunk fetch treats errors within its attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    /// The first try decides: any error aborts the fetch even if attempts remain.
    #[default]
    AbortOnFirstError,
    /// Retry transient errors with exponential backoff; abort on protocol violations.
    Backoff,
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid server_url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("min_chunk_size must be at least 1")]
    ZeroMinChunk,
    #[error("initial_chunk_size ({initial}) must be >= min_chunk_size ({min})")]
    InitialBelowFloor { initial: u64, min: u64 },
    #[error("expected_sha256 is not a 64-character hex string")]
    InvalidDigest,
    #[error("retry.base_delay_secs ({0}) is not a usable delay")]
    InvalidRetry(f64),
}

/// Everything one transfer needs: where to fetch from, how to size chunks,
/// how long to wait, and which digest the result should have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Range-capable HTTP(S) origin serving the resource.
    pub server_url: String,
    /// Size of the first range request in bytes.
    pub initial_chunk_size: u64,
    /// Floor for chunk size shrinking after short reads.
    pub min_chunk_size: u64,
    /// Attempt budget per chunk. See `RetryMode` for how it is spent.
    pub max_attempts_per_chunk: u32,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Expected SHA-256 of the assembled resource (hex, any case). None skips verification.
    #[serde(default)]
    pub expected_sha256: Option<String>,
    #[serde(default)]
    pub retry_mode: RetryMode,
    /// Backoff tuning for `RetryMode::Backoff`; built-in defaults when missing.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            initial_chunk_size: 65536,
            min_chunk_size: 1024,
            max_attempts_per_chunk: 5,
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            expected_sha256: Some(DEFAULT_EXPECTED_SHA256.to_string()),
            retry_mode: RetryMode::default(),
            retry: None,
        }
    }
}

impl FetchConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            read: Duration::from_millis(self.read_timeout_ms),
        }
    }

    /// Backoff policy built from the `[retry]` section and the per-chunk attempt budget.
    /// A base delay `validate` would reject falls back to the built-in default.
    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry.clone().unwrap_or_default();
        RetryPolicy {
            max_attempts: self.max_attempts_per_chunk,
            base_delay: Duration::try_from_secs_f64(retry.base_delay_secs)
                .unwrap_or(RetryPolicy::default().base_delay),
            max_delay: Duration::from_secs(retry.max_delay_secs),
        }
    }

    /// Reject values the transfer loop cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.server_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.server_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                url: self.server_url.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        if self.min_chunk_size == 0 {
            return Err(ConfigError::ZeroMinChunk);
        }
        if self.initial_chunk_size < self.min_chunk_size {
            return Err(ConfigError::InitialBelowFloor {
                initial: self.initial_chunk_size,
                min: self.min_chunk_size,
            });
        }
        if let Some(expected) = &self.expected_sha256 {
            let expected = expected.trim();
            if expected.len() != 64 || !expected.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidDigest);
            }
        }
        if let Some(retry) = &self.retry {
            Duration::try_from_secs_f64(retry.base_delay_secs)
                .map_err(|_| ConfigError::InvalidRetry(retry.base_delay_secs))?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rangefetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path (no defaults written).
pub fn load_from(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
