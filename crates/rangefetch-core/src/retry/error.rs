//! Chunk fetch error type for retry classification.

/// Error returned by a single range try (curl failure, protocol violation, or empty body).
/// Kept typed so strategies can classify it before it is reported.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection refused, read error, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response status was not 206 Partial Content.
    #[error("unexpected HTTP {0} (expected 206 Partial Content)")]
    UnexpectedStatus(u32),
    /// 206 response with a zero-length body.
    #[error("empty response body")]
    EmptyBody,
    /// The attempt budget allowed no try at all.
    #[error("no data after {0} attempts")]
    AttemptsExhausted(u32),
}

impl FetchError {
    /// True when the server signalled there is nothing more to read.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, FetchError::EmptyBody)
    }
}
