//! Progress snapshots for a running transfer (bytes done, rate, chunk size).
//!
//! The session sends one after each accepted chunk; consumers can compute
//! rate = bytes_done / elapsed_secs. The total size is unknown until the
//! server returns an empty range, so there is no ETA.

/// Snapshot of transfer progress (CLI-friendly).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Bytes accepted into the buffer so far.
    pub bytes_done: u64,
    /// Range requests issued so far.
    pub requests: u32,
    /// Chunk size the next request will use.
    pub chunk_size: u64,
    /// Elapsed time since transfer start (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        let p = ProgressStats {
            bytes_done: 1000,
            requests: 1,
            chunk_size: 1024,
            elapsed_secs: 0.0,
        };
        assert_eq!(p.bytes_per_sec(), 0.0);
    }

    #[test]
    fn rate_divides_bytes_by_seconds() {
        let p = ProgressStats {
            bytes_done: 65536,
            requests: 2,
            chunk_size: 65536,
            elapsed_secs: 2.0,
        };
        assert!((p.bytes_per_sec() - 32768.0).abs() < 1e-9);
    }
}
