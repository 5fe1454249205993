//! Chunked transfer session: drives the fetch loop and assembles the buffer.
//!
//! One request at a time, blocking. The loop asks the fetcher for the next
//! range, folds the outcome into `SessionState`, and stops on the first failure
//! or empty payload. Call from `spawn_blocking` if used from async code.

mod state;

pub use state::{SessionState, StopReason, Transition};

use std::time::{Duration, Instant};

use crate::checksum;
use crate::config::{ConfigError, FetchConfig};
use crate::fetcher::ChunkFetcher;
use crate::progress::ProgressStats;
use crate::transport::{CurlTransport, RangeTransport};

/// Outcome of a finished transfer. Read-only once produced.
#[derive(Debug, Clone)]
pub struct TransferResult {
    bytes: Vec<u8>,
    sha256: String,
    stop_reason: StopReason,
    requests: u32,
    final_chunk_size: u64,
    shrinks: u32,
    elapsed: Duration,
}

impl TransferResult {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex SHA-256 of `bytes`.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn stop_reason(&self) -> &StopReason {
        &self.stop_reason
    }

    /// Range requests issued, including the final empty or failed one.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn final_chunk_size(&self) -> u64 {
        self.final_chunk_size
    }

    pub fn shrinks(&self) -> u32 {
        self.shrinks
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Compare the digest to `expected_hex`, ignoring case.
    pub fn verify(&self, expected_hex: &str) -> bool {
        checksum::digest_matches(&self.sha256, expected_hex)
    }
}

/// Owns one transfer from offset 0 to stop; consumed by `run`.
pub struct TransferSession<T> {
    fetcher: ChunkFetcher<T>,
    state: SessionState,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl TransferSession<CurlTransport> {
    /// Session over libcurl for a validated configuration.
    pub fn from_config(cfg: &FetchConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::with_transport(CurlTransport::new(), cfg))
    }
}

impl<T: RangeTransport> TransferSession<T> {
    pub fn new(fetcher: ChunkFetcher<T>, initial_chunk_size: u64, min_chunk_size: u64) -> Self {
        Self {
            fetcher,
            state: SessionState::new(initial_chunk_size, min_chunk_size),
            progress_tx: None,
        }
    }

    /// Session over any transport; `cfg` is assumed valid.
    pub fn with_transport(transport: T, cfg: &FetchConfig) -> Self {
        Self::new(
            ChunkFetcher::from_config(transport, cfg),
            cfg.initial_chunk_size,
            cfg.min_chunk_size,
        )
    }

    /// Send a `ProgressStats` after each accepted chunk. Uses `try_send`, so a
    /// full channel drops snapshots instead of stalling the transfer.
    pub fn with_progress(mut self, tx: tokio::sync::mpsc::Sender<ProgressStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn run(self) -> TransferResult {
        let Self {
            fetcher,
            mut state,
            progress_tx,
        } = self;
        let started = Instant::now();
        let mut requests = 0u32;

        let stop_reason = loop {
            let request = state.next_request();
            let outcome = fetcher.fetch(&request);
            requests = requests.saturating_add(1);
            match state.apply(&request, outcome) {
                Transition::Continue(next) => {
                    state = next;
                    if let Some(tx) = &progress_tx {
                        let _ = tx.try_send(ProgressStats {
                            bytes_done: state.offset(),
                            requests,
                            chunk_size: state.chunk_size(),
                            elapsed_secs: started.elapsed().as_secs_f64(),
                        });
                    }
                }
                Transition::Stop {
                    state: last,
                    reason,
                } => {
                    state = last;
                    break reason;
                }
            }
        };

        let final_chunk_size = state.chunk_size();
        let shrinks = state.shrinks();
        let bytes = state.into_buffer();
        let sha256 = checksum::sha256_hex(&bytes);
        let elapsed = started.elapsed();

        match &stop_reason {
            StopReason::EndOfData => {
                tracing::info!(bytes = bytes.len(), requests, "transfer finished");
            }
            StopReason::Failed { error, transient } => {
                tracing::warn!(
                    bytes = bytes.len(),
                    requests,
                    transient,
                    "transfer stopped early: {}",
                    error
                );
            }
        }

        TransferResult {
            bytes,
            sha256,
            stop_reason,
            requests,
            final_chunk_size,
            shrinks,
            elapsed,
        }
    }
}

/// Validate `cfg` and run one transfer over libcurl.
pub fn run(cfg: &FetchConfig) -> Result<TransferResult, ConfigError> {
    Ok(TransferSession::from_config(cfg)?.run())
}
