//! # Content Digest
//!
//! SHA-256 digests of definition-file sources, recorded in the `x-source`
//! provenance block of generated schemas so a schema can be traced back to
//! the exact source text it was generated from. Provenance is informational
//! only and never participates in validation semantics.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A SHA-256 digest of source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Digest raw source bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self { bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Convenience wrapper: SHA-256 hex string of raw bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    ContentDigest::of_bytes(data).to_hex()
}
