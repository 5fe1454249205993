//! `rangefetch fetch` – chunked transfer plus digest verdict.

use anyhow::{Context, Result};
use rangefetch_core::config::{FetchConfig, RetryMode};
use rangefetch_core::progress::ProgressStats;
use rangefetch_core::retry::FetchError;
use rangefetch_core::session::StopReason;
use rangefetch_core::{TransferResult, TransferSession};

use super::load_config;
use crate::cli::FetchArgs;

/// Apply command-line overrides on top of the loaded config.
pub(crate) fn apply_overrides(cfg: &mut FetchConfig, args: &FetchArgs) {
    if let Some(url) = &args.url {
        cfg.server_url = url.clone();
    }
    if let Some(n) = args.chunk_size {
        cfg.initial_chunk_size = n;
    }
    if let Some(n) = args.min_chunk_size {
        cfg.min_chunk_size = n;
    }
    if let Some(n) = args.max_attempts {
        cfg.max_attempts_per_chunk = n;
    }
    if let Some(ms) = args.connect_timeout_ms {
        cfg.connect_timeout_ms = ms;
    }
    if let Some(ms) = args.read_timeout_ms {
        cfg.read_timeout_ms = ms;
    }
    if let Some(hex) = &args.expected_sha256 {
        cfg.expected_sha256 = Some(hex.clone());
    }
    if args.backoff {
        cfg.retry_mode = RetryMode::Backoff;
    }
}

fn print_progress(p: &ProgressStats) {
    println!(
        "  {:>10} bytes  {:>4} requests  chunk {:>6}  {:>8.1} KiB/s",
        p.bytes_done,
        p.requests,
        p.chunk_size,
        p.bytes_per_sec() / 1024.0
    );
}

const STATUS_RANGE_NOT_SATISFIABLE: u32 = 416;

/// One-line note on why the transfer stopped; None for a clean end of data.
/// Servers that answer a range past the end with 416 still delivered everything before it.
fn stop_note(reason: &StopReason, bytes_done: u64) -> Option<String> {
    match reason {
        StopReason::EndOfData => None,
        StopReason::Failed {
            error: FetchError::UnexpectedStatus(STATUS_RANGE_NOT_SATISFIABLE),
            ..
        } if bytes_done > 0 => Some(
            "Server reported the end of the resource (HTTP 416).".to_string(),
        ),
        StopReason::Failed { error, .. } => Some(format!("Transfer stopped early: {}", error)),
    }
}

fn print_summary(res: &TransferResult, expected: Option<&str>) {
    if let Some(note) = stop_note(res.stop_reason(), res.len()) {
        println!("{}", note);
    }
    println!("Total downloaded size: {} bytes", res.len());
    println!("SHA-256 hash of downloaded data: {}", res.sha256());
    match expected {
        Some(hex) if res.verify(hex) => println!("Hash matches! Data downloaded successfully."),
        Some(_) => println!("Hash does not match. Data may be corrupted."),
        None => println!("No expected hash configured; skipping verification."),
    }
    println!("Total download time: {} ms", res.elapsed().as_millis());
}

/// Run one transfer. A digest mismatch is reported, not returned as an error.
pub async fn run_fetch(args: FetchArgs) -> Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    apply_overrides(&mut cfg, &args);
    let session = TransferSession::from_config(&cfg).context("invalid configuration")?;

    println!("Starting download from {}...", cfg.server_url);

    let (tx, mut rx) = tokio::sync::mpsc::channel::<ProgressStats>(64);
    let handle = tokio::task::spawn_blocking(move || session.with_progress(tx).run());
    while let Some(p) = rx.recv().await {
        print_progress(&p);
    }
    let res = handle.await.context("transfer task join")?;

    print_summary(&res, cfg.expected_sha256.as_deref());
    Ok(())
}
