//! # Strict Signature Verification
//!
//! The resolver checks authentication responses through [`verify_strict`],
//! which rejects weak keys and non-canonical signatures that the lenient
//! [`PublicKey::verify`] would accept.

use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use thiserror::Error;

use super::keys::{PublicKey, Signature};

/// Errors during signature verification. Intentionally vague.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignatureBytes,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Strict verification with a reason on failure.
pub fn verify_strict(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    let verifying_key = VerifyingKey::from_bytes(public_key.as_bytes())
        .map_err(|_| SignatureError::InvalidPublicKey)?;
    let sig_bytes: [u8; 64] = signature
        .as_bytes()
        .try_into()
        .map_err(|_| SignatureError::InvalidSignatureBytes)?;
    verifying_key
        .verify_strict(message, &DalekSignature::from_bytes(&sig_bytes))
        .map_err(|_| SignatureError::VerificationFailed)
}
