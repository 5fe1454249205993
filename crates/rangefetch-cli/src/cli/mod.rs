//! CLI for rangefetch.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_config, run_fetch};

/// Top-level CLI for rangefetch. Without a subcommand, runs `fetch` with the stored config.
#[derive(Debug, Parser)]
#[command(name = "rangefetch")]
#[command(about = "Fetch a resource in adaptive HTTP Range chunks and verify its SHA-256", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the configured resource chunk by chunk and verify its digest.
    Fetch(FetchArgs),

    /// Compute SHA-256 of a file, optionally comparing it to an expected digest.
    Checksum {
        /// Path to the file.
        path: String,
        /// Expected digest (hex, any case).
        #[arg(long, value_name = "HEX")]
        expect: Option<String>,
    },

    /// Print the config file path and the effective configuration.
    Config {
        /// Read this config file instead of the default location.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

/// Overrides applied on top of the config file.
#[derive(Debug, Default, Args)]
pub struct FetchArgs {
    /// Read this config file instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Range-capable HTTP(S) URL of the resource.
    #[arg(long)]
    pub url: Option<String>,
    /// Initial chunk size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,
    /// Smallest chunk size after shrinking, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub min_chunk_size: Option<u64>,
    /// Attempt budget per chunk.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,
    #[arg(long, value_name = "MS")]
    pub connect_timeout_ms: Option<u64>,
    #[arg(long, value_name = "MS")]
    pub read_timeout_ms: Option<u64>,
    /// Expected SHA-256 of the whole resource (hex, any case).
    #[arg(long, value_name = "HEX")]
    pub expected_sha256: Option<String>,
    /// Retry transient errors with exponential backoff instead of stopping at the first error.
    #[arg(long)]
    pub backoff: bool,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        match cli.command.unwrap_or(CliCommand::Fetch(FetchArgs::default())) {
            CliCommand::Fetch(args) => run_fetch(args).await?,
            CliCommand::Checksum { path, expect } => {
                run_checksum(Path::new(&path), expect.as_deref()).await?
            }
            CliCommand::Config { config } => run_config(config.as_deref()).await?,
        }
        Ok(())
    }
}
