// Ballpark - Raw Key Generation
//
// Raw key layout: `<service-name>_<token>`, where the token is 32 random bytes
// encoded as unpadded URL-safe base64 (43 chars). The service-name prefix makes
// a leaked key traceable by inspection; the 10-char display prefix is cut from
// the token, never from the full key.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::api_keys::ServiceName;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Random bytes per token (256-bit entropy).
pub const TOKEN_BYTES: usize = 32;

/// Length of the non-secret display prefix stored alongside the hash.
pub const KEY_PREFIX_LEN: usize = 10;

const SEPARATOR: char = '_';

// ─── Generated Key ───────────────────────────────────────────────────────────

/// A freshly issued raw key together with its display prefix.
pub struct GeneratedKey {
    raw_key: Zeroizing<String>,
    prefix: String,
}

impl GeneratedKey {
    /// The full raw key. Shown to the operator exactly once.
    pub fn raw_key(&self) -> &str {
        &self.raw_key
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn into_raw_key(self) -> Zeroizing<String> {
        self.raw_key
    }
}

impl fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("raw_key", &"[REDACTED]")
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Generate a new raw key for `service_name` from the thread-local CSPRNG.
pub fn generate_raw_key(service_name: &ServiceName) -> GeneratedKey {
    let mut bytes = Zeroizing::new([0u8; TOKEN_BYTES]);
    rand::rng().fill_bytes(&mut bytes[..]);

    let token = Zeroizing::new(URL_SAFE_NO_PAD.encode(&bytes[..]));
    let prefix = token[..KEY_PREFIX_LEN].to_string();
    let raw_key = Zeroizing::new(format!(
        "{}{}{}",
        service_name.as_str(),
        SEPARATOR,
        token.as_str()
    ));

    GeneratedKey { raw_key, prefix }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
