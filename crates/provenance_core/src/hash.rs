//! Cryptographic digests for event hashing.
//!
//! Uses SHA-256 for all hashing operations. Digests travel as lowercase hex.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// A SHA-256 digest (256 bits / 32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Length of the hex form
    pub const HEX_LEN: usize = 64;

    /// Compute SHA-256 of data
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Leading `len` characters of a hex hash, for logs.
#[must_use]
pub fn short_hex(hex: &str, len: usize) -> &str {
    hex.get(..len).unwrap_or(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_vector() {
        let digest = Digest::compute(b"abc");
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_hex_shape() {
        let hex = Digest::compute(b"hello world").to_hex();
        assert_eq!(hex.len(), Digest::HEX_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(short_hex("0123456789abcdef", 10), "0123456789");
        assert_eq!(short_hex("abc", 10), "abc");
        assert_eq!(short_hex("", 10), "");
    }
}
