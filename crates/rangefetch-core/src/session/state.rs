//! Transfer state and its pure transition function.
//!
//! `SessionState::apply` folds one `ChunkOutcome` into the state without any
//! I/O, so the chunk-sizing and stop rules are testable on their own.

use crate::fetcher::ChunkOutcome;
use crate::range::RangeRequest;
use crate::retry::FetchError;

/// Why the transfer loop ended.
#[derive(Debug, Clone)]
pub enum StopReason {
    /// The server returned an empty range: nothing left to read.
    EndOfData,
    /// A chunk fetch failed; no further requests were made.
    Failed { error: FetchError, transient: bool },
}

impl StopReason {
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, StopReason::EndOfData)
    }
}

/// Progress of one transfer. Invariant: `buffer.len() == offset` between transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    offset: u64,
    chunk_size: u64,
    min_chunk_size: u64,
    buffer: Vec<u8>,
    shrinks: u32,
}

/// Result of applying one outcome.
#[derive(Debug)]
pub enum Transition {
    Continue(SessionState),
    Stop {
        state: SessionState,
        reason: StopReason,
    },
}

impl SessionState {
    /// Fresh state at offset 0. The floor is at least 1 byte and the initial
    /// size is raised to the floor so chunk size can only ever shrink.
    pub fn new(initial_chunk_size: u64, min_chunk_size: u64) -> Self {
        let min_chunk_size = min_chunk_size.max(1);
        Self {
            offset: 0,
            chunk_size: initial_chunk_size.max(min_chunk_size),
            min_chunk_size,
            buffer: Vec::new(),
            shrinks: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn min_chunk_size(&self) -> u64 {
        self.min_chunk_size
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of times the chunk size actually decreased.
    pub fn shrinks(&self) -> u32 {
        self.shrinks
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// The range to ask for next: `[offset, offset + chunk_size - 1]`.
    pub fn next_request(&self) -> RangeRequest {
        RangeRequest::new(self.offset, self.chunk_size)
    }

    /// Fold the outcome of `request` into the state.
    ///
    /// Failures and empty payloads stop the transfer. Otherwise the bytes are
    /// appended, the offset advances by what was received, and a read shorter
    /// than both the request and the current chunk size halves the chunk size
    /// (floored). A short read is treated as a capacity signal even when the
    /// resource simply ended; the following empty range ends the loop.
    pub fn apply(mut self, request: &RangeRequest, outcome: ChunkOutcome) -> Transition {
        let received = match outcome {
            ChunkOutcome::Success(bytes) if bytes.is_empty() => {
                return self.stop(StopReason::EndOfData);
            }
            ChunkOutcome::Success(bytes) => bytes,
            ChunkOutcome::PermanentFailure(error) if error.is_end_of_data() => {
                return self.stop(StopReason::EndOfData);
            }
            ChunkOutcome::PermanentFailure(error) => {
                return self.stop(StopReason::Failed {
                    error,
                    transient: false,
                });
            }
            ChunkOutcome::TransientFailure(error) => {
                return self.stop(StopReason::Failed {
                    error,
                    transient: true,
                });
            }
        };

        let n = received.len() as u64;
        self.buffer.extend_from_slice(&received);

        let expected = request.len;
        if n < expected && n < self.chunk_size {
            let next = (self.chunk_size / 2).max(self.min_chunk_size).min(self.chunk_size);
            if next < self.chunk_size {
                self.shrinks += 1;
                tracing::info!(
                    from = self.chunk_size,
                    to = next,
                    received = n,
                    expected,
                    "reduced chunk size due to incomplete download"
                );
            }
            self.chunk_size = next;
        }

        self.offset += n;
        debug_assert_eq!(self.offset, self.buffer.len() as u64);
        Transition::Continue(self)
    }

    fn stop(self, reason: StopReason) -> Transition {
        Transition::Stop {
            state: self,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(len: usize) -> ChunkOutcome {
        ChunkOutcome::Success(vec![1; len])
    }

    fn step(state: SessionState, len: usize) -> SessionState {
        let req = state.next_request();
        match state.apply(&req, success(len)) {
            Transition::Continue(s) => s,
            Transition::Stop { reason, .. } => panic!("unexpected stop: {:?}", reason),
        }
    }

    #[test]
    fn full_reads_keep_chunk_size() {
        let mut s = SessionState::new(4096, 1024);
        for i in 1..=4u64 {
            s = step(s, 4096);
            assert_eq!(s.chunk_size(), 4096);
            assert_eq!(s.offset(), 4096 * i);
            assert_eq!(s.buffer().len() as u64, s.offset());
        }
        assert_eq!(s.shrinks(), 0);
    }

    #[test]
    fn short_read_halves_chunk_size() {
        let s = SessionState::new(65536, 1024);
        let s = step(s, 65536);
        let s = step(s, 34464);
        assert_eq!(s.chunk_size(), 32768);
        assert_eq!(s.offset(), 100_000);
        assert_eq!(s.next_request().header_value(), "bytes=100000-132767");
        assert_eq!(s.shrinks(), 1);
    }

    #[test]
    fn shrink_stops_at_floor() {
        let mut s = SessionState::new(2048, 1024);
        s = step(s, 100);
        assert_eq!(s.chunk_size(), 1024);
        for _ in 0..5 {
            s = step(s, 100);
            assert_eq!(s.chunk_size(), 1024);
        }
        assert_eq!(s.offset(), 600);
        assert_eq!(s.shrinks(), 1);
    }

    #[test]
    fn chunk_size_never_increases() {
        let mut s = SessionState::new(65536, 1024);
        let mut prev = s.chunk_size();
        for len in [65536, 10, 40000, 65536, 1, 1, 1, 1, 1, 1, 1, 1024, 0x1000] {
            s = step(s, len);
            assert!(s.chunk_size() <= prev);
            assert!(s.chunk_size() >= s.min_chunk_size());
            assert_eq!(s.buffer().len() as u64, s.offset());
            prev = s.chunk_size();
        }
    }

    #[test]
    fn read_longer_than_requested_is_accepted_without_shrink() {
        let s = SessionState::new(1024, 1024);
        let s = step(s, 1500);
        assert_eq!(s.offset(), 1500);
        assert_eq!(s.chunk_size(), 1024);
    }

    #[test]
    fn empty_success_ends_cleanly() {
        let s = step(SessionState::new(1024, 1024), 1024);
        let req = s.next_request();
        match s.apply(&req, ChunkOutcome::Success(Vec::new())) {
            Transition::Stop { state, reason } => {
                assert!(reason.is_end_of_data());
                assert_eq!(state.offset(), 1024);
            }
            Transition::Continue(_) => panic!("empty payload must stop"),
        }
    }

    #[test]
    fn empty_body_failure_ends_cleanly() {
        let s = SessionState::new(1024, 1024);
        let req = s.next_request();
        match s.apply(&req, ChunkOutcome::PermanentFailure(FetchError::EmptyBody)) {
            Transition::Stop { reason, .. } => assert!(reason.is_end_of_data()),
            Transition::Continue(_) => panic!("empty body must stop"),
        }
    }

    #[test]
    fn failures_stop_and_keep_buffer() {
        let s = step(SessionState::new(1024, 1024), 1024);
        let req = s.next_request();
        match s.apply(
            &req,
            ChunkOutcome::PermanentFailure(FetchError::UnexpectedStatus(200)),
        ) {
            Transition::Stop { state, reason } => {
                assert!(matches!(
                    reason,
                    StopReason::Failed {
                        error: FetchError::UnexpectedStatus(200),
                        transient: false
                    }
                ));
                assert_eq!(state.buffer().len(), 1024);
                assert_eq!(state.chunk_size(), 1024);
            }
            Transition::Continue(_) => panic!("failure must stop"),
        }

        let s = SessionState::new(1024, 1024);
        let req = s.next_request();
        match s.apply(
            &req,
            ChunkOutcome::TransientFailure(FetchError::UnexpectedStatus(503)),
        ) {
            Transition::Stop { reason, .. } => {
                assert!(matches!(reason, StopReason::Failed { transient: true, .. }))
            }
            Transition::Continue(_) => panic!("failure must stop"),
        }
    }

    #[test]
    fn new_clamps_degenerate_sizes() {
        let s = SessionState::new(512, 1024);
        assert_eq!(s.chunk_size(), 1024);
        let s = SessionState::new(0, 0);
        assert_eq!(s.min_chunk_size(), 1);
        assert_eq!(s.chunk_size(), 1);
        assert_eq!(s.next_request().header_value(), "bytes=0-0");
    }
}
