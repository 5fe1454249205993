//! Error classification and retry policy for chunk fetches.
//!
//! Maps curl errors and HTTP statuses into coarse kinds (timeouts, throttling,
//! connection failures, protocol violations) and decides exponential backoff,
//! so the fetcher's strategies share one consistent view of what is transient.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
