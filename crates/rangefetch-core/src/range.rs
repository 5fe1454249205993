//! Byte range of one chunk request.

/// A single range request: `len` bytes starting at `start`, inclusive bounds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    /// Start offset (inclusive).
    pub start: u64,
    /// Requested length in bytes; always at least 1.
    pub len: u64,
}

impl RangeRequest {
    pub fn new(start: u64, len: u64) -> Self {
        Self {
            start,
            len: len.max(1),
        }
    }

    /// Inclusive end offset: `start + len - 1`.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.len - 1)
    }

    /// HTTP Range header value (inclusive end): `bytes=start-end`.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end())
    }

    /// Range as curl expects it: `start-end` without the `bytes=` unit.
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end())
    }
}
