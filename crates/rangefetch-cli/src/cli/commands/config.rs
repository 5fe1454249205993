//! `rangefetch config` – show where the config lives and what it contains.

use anyhow::Result;
use rangefetch_core::config;
use std::path::Path;

use super::load_config;

pub async fn run_config(path: Option<&Path>) -> Result<()> {
    let cfg = load_config(path)?;
    let shown = match path {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", shown.display());
    print!("{}", toml::to_string_pretty(&cfg)?);
    if let Err(e) = cfg.validate() {
        println!("# warning: {}", e);
    }
    Ok(())
}
