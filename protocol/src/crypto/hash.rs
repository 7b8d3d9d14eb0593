//! # Hashing Utilities
//!
//! SHA-256 is the only hash in this crate. It addresses documents (the
//! digest of a canonical genesis header) and turns wallet signatures into
//! entropy strings. Both uses have to match what other implementations of
//! the same formats compute, which rules out anything more exotic.

use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a fixed-size array.
///
/// ```
/// use keylink_protocol::crypto::sha256_array;
///
/// assert_eq!(sha256_array(b"keylink").len(), 32);
/// ```
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `0x`-prefixed lowercase hex of the SHA-256 digest.
pub fn sha256_hex_prefixed(data: &[u8]) -> String {
    format!("0x{}", hex::encode(sha256_array(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256("abc"), FIPS 180-2 appendix B.1.
        assert_eq!(
            hex::encode(sha256_array(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hex_prefixed_shape() {
        let h = sha256_hex_prefixed(b"abc");
        assert_eq!(
            h,
            "0xba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
