pub mod config;
pub mod logging;

pub mod checksum;
pub mod fetcher;
pub mod progress;
pub mod range;
pub mod retry;
pub mod session;
pub mod transport;

pub use session::{run, TransferResult, TransferSession};
