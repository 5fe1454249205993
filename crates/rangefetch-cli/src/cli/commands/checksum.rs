//! Checksum command: compute SHA-256 of a file.

use anyhow::Result;
use rangefetch_core::checksum;
use std::path::Path;

/// Compute and print SHA-256 of the given file, plus a verdict when `expect` is set.
pub async fn run_checksum(path: &Path, expect: Option<&str>) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    if let Some(expected) = expect {
        if checksum::digest_matches(&digest, expected) {
            println!("Hash matches.");
        } else {
            println!("Hash does not match (expected {}).", expected.trim());
        }
    }
    Ok(())
}
