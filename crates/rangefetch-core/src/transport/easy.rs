//! libcurl-backed transport: a fresh easy handle per try.

use std::cell::Cell;
use std::str;
use std::time::Duration;

use super::{RangeResponse, RangeTransport, Timeouts, STATUS_PARTIAL_CONTENT};
use crate::range::RangeRequest;
use crate::retry::FetchError;

/// Curl treats the low-speed window in whole seconds.
const MIN_STALL_WINDOW: Duration = Duration::from_secs(1);

/// Curl reads a zero connect timeout as "use the 300 s default".
const MIN_CONNECT_TIMEOUT: Duration = Duration::from_millis(1);

fn connect_timeout(configured: Duration) -> Duration {
    configured.max(MIN_CONNECT_TIMEOUT)
}

/// Status code from an `HTTP/x y reason` line; None for any other header line.
fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        Self
    }
}

impl RangeTransport for CurlTransport {
    fn get_range(
        &self,
        url: &str,
        range: &RangeRequest,
        timeouts: &Timeouts,
    ) -> Result<RangeResponse, FetchError> {
        let mut body: Vec<u8> = Vec::new();
        // Status of the latest response; redirects reset it with their own status line.
        let status = Cell::new(0u32);

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(connect_timeout(timeouts.connect))?;
        // Read timeout: abort once nothing arrives for the whole window.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(timeouts.read.max(MIN_STALL_WINDOW))?;
        easy.range(&range.curl_range())?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                    status.set(code);
                }
                true
            })?;
            // Only a 206 body is worth keeping; anything else aborts before it is buffered.
            transfer.write_function(|data| {
                if status.get() != STATUS_PARTIAL_CONTENT {
                    return Ok(0);
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            if let Err(e) = transfer.perform() {
                if e.is_write_error() && status.get() != STATUS_PARTIAL_CONTENT {
                    return Err(FetchError::UnexpectedStatus(status.get()));
                }
                return Err(FetchError::Curl(e));
            }
        }

        let status = easy.response_code()?;
        tracing::trace!(url, range = %range.header_value(), status, bytes = body.len(), "range GET done");
        Ok(RangeResponse { status, body })
    }
}
