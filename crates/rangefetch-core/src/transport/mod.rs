//! One range GET against the origin.
//!
//! `RangeTransport` is the seam between the fetch strategies and the network:
//! production code uses `CurlTransport`, tests script responses directly.

mod easy;

pub use easy::CurlTransport;

use std::time::Duration;

use crate::range::RangeRequest;
use crate::retry::FetchError;

/// HTTP 206 Partial Content.
pub const STATUS_PARTIAL_CONTENT: u32 = 206;

/// Connect and read timeouts for one try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    /// Longest stall (no bytes received) tolerated while reading.
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            read: Duration::from_secs(5),
        }
    }
}

/// Completed exchange: status code and the full body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl RangeResponse {
    pub fn is_partial_content(&self) -> bool {
        self.status == STATUS_PARTIAL_CONTENT
    }
}

/// Issues a single GET with `Range: bytes=start-end`. Any connection opened
/// for the request must be closed before this returns.
pub trait RangeTransport {
    fn get_range(
        &self,
        url: &str,
        range: &RangeRequest,
        timeouts: &Timeouts,
    ) -> Result<RangeResponse, FetchError>;
}

impl<T: RangeTransport + ?Sized> RangeTransport for &T {
    fn get_range(
        &self,
        url: &str,
        range: &RangeRequest,
        timeouts: &Timeouts,
    ) -> Result<RangeResponse, FetchError> {
        (**self).get_range(url, range, timeouts)
    }
}
