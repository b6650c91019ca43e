use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::Digest;
use sha2::Sha256;

/// Deterministic digest for API keys and other opaque secrets.
///
/// SHA-256 without salt, base64 encoded. The same input always yields the
/// same output so stored records can be looked up by exact match. Not
/// suitable for low-entropy secrets such as passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyHasher;

impl KeyHasher {
    pub fn new() -> Self {
        Self
    }

    /// Digest a secret.
    pub fn hash(&self, key: &str) -> String {
        STANDARD.encode(Sha256::digest(key.as_bytes()))
    }

    /// Compare a presented secret with a stored digest.
    pub fn verify(&self, key: &str, stored_hash: &str) -> bool {
        self.hash(key) == stored_hash
    }
}
