// Ballpark - Peppered Key Hashing
//
// digest = hex(SHA-256(pepper || ":" || raw_key))
//
// The pepper is process-wide, supplied by configuration at startup, and never
// persisted. Hashing is deterministic so the digest doubles as the lookup key.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Computes the stored form of a raw API key.
#[derive(Clone)]
pub struct SecretHasher {
    pepper: Zeroizing<String>,
}

impl SecretHasher {
    pub fn new(pepper: &str) -> Self {
        Self {
            pepper: Zeroizing::new(pepper.to_string()),
        }
    }

    /// Hash a raw key. Returns 64 lowercase hex chars.
    pub fn hash(&self, raw_key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.pepper.as_bytes());
        hasher.update(b":");
        hasher.update(raw_key.as_bytes());
        to_hex(&hasher.finalize())
    }
}

impl fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretHasher")
            .field("pepper", &"[REDACTED]")
            .finish()
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = SecretHasher::new("pepper-123");
        assert_eq!(hasher.hash("draft-kit_abc"), hasher.hash("draft-kit_abc"));
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let digest = SecretHasher::new("pepper").hash("key");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_matches_known_vector() {
        // sha256("p:k")
        let expected = {
            let mut h = Sha256::new();
            h.update(b"p:k");
            to_hex(&h.finalize())
        };
        assert_eq!(SecretHasher::new("p").hash("k"), expected);
    }

    #[test]
    fn test_pepper_changes_digest() {
        let a = SecretHasher::new("pepper-a").hash("draft-kit_abc");
        let b = SecretHasher::new("pepper-b").hash("draft-kit_abc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_differs_from_raw_key() {
        let raw = "draft-kit_abcdefghij";
        assert_ne!(SecretHasher::new("pepper").hash(raw), raw);
    }

    #[test]
    fn test_debug_redacts_pepper() {
        let debug = format!("{:?}", SecretHasher::new("super-secret-pepper"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-pepper"));
    }
}
