//! Per-chunk fetch: one bounded range request with an attempt budget.
//!
//! Two strategies spend the budget differently. `AbortOnFirstError` lets the
//! first try decide the outcome, so the budget only bounds the loop on paper.
//! `Backoff` retries transient errors with exponential backoff and aborts
//! immediately on protocol violations.

use crate::config::{FetchConfig, RetryMode};
use crate::range::RangeRequest;
use crate::retry::{classify, run_with_retry, FetchError, RetryPolicy};
use crate::transport::{RangeTransport, Timeouts};

/// Result of fetching one chunk, consumed exactly once by the session.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// 206 with the full body; may be empty when produced by other sources.
    Success(Vec<u8>),
    /// Timeout, connection failure, throttling or 5xx.
    TransientFailure(FetchError),
    /// Protocol violation, empty body, or exhausted budget.
    PermanentFailure(FetchError),
}

impl ChunkOutcome {
    /// Tag an error by whether a later try could succeed.
    pub fn from_error(e: FetchError) -> Self {
        if classify(&e).is_transient() {
            ChunkOutcome::TransientFailure(e)
        } else {
            ChunkOutcome::PermanentFailure(e)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChunkOutcome::Success(_))
    }
}

/// How the attempt budget is spent.
#[derive(Debug, Clone, Copy)]
pub enum FetchStrategy {
    /// Up to `max_attempts` tries, but the first completed or failed try returns.
    AbortOnFirstError { max_attempts: u32 },
    /// Bounded retry with backoff on transient errors only.
    Backoff(RetryPolicy),
}

impl FetchStrategy {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        match cfg.retry_mode {
            RetryMode::AbortOnFirstError => FetchStrategy::AbortOnFirstError {
                max_attempts: cfg.max_attempts_per_chunk,
            },
            RetryMode::Backoff => FetchStrategy::Backoff(cfg.retry_policy()),
        }
    }
}

/// Fetches ranges of one resource through a transport.
pub struct ChunkFetcher<T> {
    transport: T,
    url: String,
    timeouts: Timeouts,
    strategy: FetchStrategy,
}

impl<T: RangeTransport> ChunkFetcher<T> {
    pub fn new(transport: T, url: impl Into<String>, timeouts: Timeouts, strategy: FetchStrategy) -> Self {
        Self {
            transport,
            url: url.into(),
            timeouts,
            strategy,
        }
    }

    pub fn from_config(transport: T, cfg: &FetchConfig) -> Self {
        Self::new(
            transport,
            cfg.server_url.clone(),
            cfg.timeouts(),
            FetchStrategy::from_config(cfg),
        )
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    /// Fetch `range`, spending the attempt budget according to the strategy.
    pub fn fetch(&self, range: &RangeRequest) -> ChunkOutcome {
        tracing::debug!(range = %range.header_value(), "downloading range");
        match self.strategy {
            FetchStrategy::AbortOnFirstError { max_attempts } => {
                self.fetch_abort_on_first_error(range, max_attempts)
            }
            FetchStrategy::Backoff(policy) => self.fetch_with_backoff(range, &policy),
        }
    }

    fn fetch_abort_on_first_error(&self, range: &RangeRequest, max_attempts: u32) -> ChunkOutcome {
        // Lazily bounded by the budget; only the first try is ever taken.
        let mut tries = (1..=max_attempts).map(|attempt| (attempt, self.try_once(range)));
        match tries.next() {
            Some((attempt, Ok(body))) => {
                tracing::debug!(range = %range.header_value(), attempt, bytes = body.len(), "range downloaded");
                ChunkOutcome::Success(body)
            }
            Some((attempt, Err(e))) => {
                tracing::warn!(range = %range.header_value(), attempt, "stopping download: {}", e);
                ChunkOutcome::from_error(e)
            }
            None => {
                tracing::warn!(range = %range.header_value(), max_attempts, "failed to download range");
                ChunkOutcome::PermanentFailure(FetchError::AttemptsExhausted(max_attempts))
            }
        }
    }

    fn fetch_with_backoff(&self, range: &RangeRequest, policy: &RetryPolicy) -> ChunkOutcome {
        match run_with_retry(policy, |_attempt| self.try_once(range)) {
            Ok(body) => {
                tracing::debug!(range = %range.header_value(), bytes = body.len(), "range downloaded");
                ChunkOutcome::Success(body)
            }
            Err(e) => {
                tracing::warn!(range = %range.header_value(), "giving up on range: {}", e);
                ChunkOutcome::from_error(e)
            }
        }
    }

    /// One network round trip. Non-206 and empty bodies are errors.
    fn try_once(&self, range: &RangeRequest) -> Result<Vec<u8>, FetchError> {
        let started = std::time::Instant::now();
        let resp = self.transport.get_range(&self.url, range, &self.timeouts)?;
        tracing::trace!(elapsed_ms = started.elapsed().as_millis() as u64, "request completed");
        if !resp.is_partial_content() {
            return Err(FetchError::UnexpectedStatus(resp.status));
        }
        if resp.body.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(resp.body)
    }
}
