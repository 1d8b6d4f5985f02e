//! Content hashing for uploaded files.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the given bytes.
///
/// Stored as `images.content_hash`; equal digests mean byte-identical files.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
