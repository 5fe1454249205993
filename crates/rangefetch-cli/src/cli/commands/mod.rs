//! CLI command handlers, one per file.

mod checksum;
mod config;
mod fetch;

pub use checksum::run_checksum;
pub use config::run_config;
pub use fetch::run_fetch;

use anyhow::Result;
use rangefetch_core::config::{self as core_config, FetchConfig};
use std::path::Path;

/// Config from `path` if given, else the default location (created on first use).
pub(crate) fn load_config(path: Option<&Path>) -> Result<FetchConfig> {
    let cfg = match path {
        Some(p) => core_config::load_from(p)?,
        None => core_config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}
