// Ballpark - Secret Module
//
// Issues one-time raw API keys and computes the peppered digest that is the
// only form of a key ever persisted. Raw keys live in zeroizing buffers and
// are never written to logs or Debug output.

mod generator;
mod hasher;

pub use generator::{generate_raw_key, GeneratedKey, KEY_PREFIX_LEN, TOKEN_BYTES};
pub use hasher::SecretHasher;
