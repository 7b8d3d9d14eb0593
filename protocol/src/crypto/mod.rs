//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over `ed25519-dalek` and `sha2`.
//!
//! - **Ed25519** for both the application identity and wallet accounts.
//! - **SHA-256** for document addressing and signature-derived entropy.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{sha256_array, sha256_hex_prefixed};
pub use keys::{Ed25519Keypair, KeyError, PublicKey, Signature};
pub use signatures::{verify_strict, SignatureError};
