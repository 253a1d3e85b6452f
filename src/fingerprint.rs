//! Content fingerprinting for cache invalidation
//!
//! A fast non-cryptographic 64-bit hash of the full image content.
//! Used purely as a change-detection token, never for integrity. The
//! streaming accumulator makes the digest invariant to read chunking.

use crate::exceptions::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read block size for streaming fingerprint computation
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Compute the fingerprint of everything readable from `reader`.
///
/// Returns 16 lowercase hex digits.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut digest = crc64fast::Digest::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        digest.write(&buffer[..bytes_read]);
    }

    Ok(format!("{:016x}", digest.sum64()))
}

/// Compute the fingerprint of a file on disk
pub fn fingerprint_file(path: &Path) -> Result<String> {
    fingerprint_reader(File::open(path)?)
}
