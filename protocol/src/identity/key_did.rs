//! # `did:key` Identifiers
//!
//! Encodes an Ed25519 public key as a self-describing `did:key` DID and
//! expands it into the W3C DID Document a resolver hands back. The method
//! needs no registry: the document is a pure function of the key.
//!
//! ## Format
//!
//! ```text
//! did:key:z<base58btc(0xed 0x01 ++ public_key)>
//! ```
//!
//! Ed25519 keys always encode to identifiers starting with `did:key:z6Mk`.
//!
//! ## Standards References
//!
//! - [did:key Method](https://w3c-ccg.github.io/did-method-key/)
//! - [DID Core v1.0](https://www.w3.org/TR/did-core/)
//! - [Ed25519VerificationKey2020](https://w3c-ccg.github.io/di-eddsa-2020/)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ED25519_MULTICODEC, MULTIBASE_BASE58BTC};
use crate::crypto::keys::PublicKey;

/// DID method name.
pub const KEY_DID_METHOD: &str = "key";

/// Context URI for the W3C DID Core specification.
const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Context URI for the Ed25519 verification key suite.
const ED25519_CONTEXT: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// Verification method type for Ed25519 public keys.
const VERIFICATION_KEY_TYPE: &str = "Ed25519VerificationKey2020";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing or expanding a DID.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DidError {
    /// The DID string does not match `did:<method>:<id>`.
    #[error("invalid DID format: {0}")]
    InvalidFormat(String),

    /// The DID method is not the one this parser handles.
    #[error("unsupported DID method: '{0}'")]
    UnsupportedMethod(String),

    /// The method-specific identifier does not decode to an Ed25519 key.
    #[error("invalid key material in DID: {0}")]
    InvalidKey(String),

    /// Serialization error during document generation.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Split a DID into `(method, method-specific-id)`.
pub fn split_did(did: &str) -> Result<(&str, &str), DidError> {
    let mut parts = did.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("did"), Some(method), Some(id)) if !method.is_empty() && !id.is_empty() => {
            Ok((method, id))
        }
        (Some(prefix), Some(_), Some(_)) if prefix != "did" => Err(DidError::InvalidFormat(
            format!("expected 'did' prefix, got '{prefix}'"),
        )),
        _ => Err(DidError::InvalidFormat(
            "DID must have format 'did:<method>:<identifier>'".into(),
        )),
    }
}

/// Encode an Ed25519 public key as multibase base58btc with the
/// `ed25519-pub` multicodec prefix.
pub fn ed25519_multibase(public_key: &PublicKey) -> String {
    let mut bytes = Vec::with_capacity(34);
    bytes.extend_from_slice(&ED25519_MULTICODEC);
    bytes.extend_from_slice(public_key.as_bytes());
    format!("{}{}", MULTIBASE_BASE58BTC, bs58::encode(&bytes).into_string())
}

/// Inverse of [`ed25519_multibase`].
pub fn decode_ed25519_multibase(multibase: &str) -> Result<PublicKey, DidError> {
    let encoded = multibase.strip_prefix(MULTIBASE_BASE58BTC).ok_or_else(|| {
        DidError::InvalidKey("expected base58btc multibase ('z' prefix)".into())
    })?;
    let decoded = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| DidError::InvalidKey(e.to_string()))?;
    if decoded.len() < 2 || decoded[..2] != ED25519_MULTICODEC {
        return Err(DidError::InvalidKey(
            "not an ed25519-pub multicodec (0xed 0x01)".into(),
        ));
    }
    PublicKey::try_from_slice(&decoded[2..]).map_err(|e| DidError::InvalidKey(e.to_string()))
}

// ---------------------------------------------------------------------------
// KeyDid
// ---------------------------------------------------------------------------

/// A `did:key` DID for an Ed25519 public key.
///
/// ```
/// use keylink_protocol::crypto::Ed25519Keypair;
/// use keylink_protocol::identity::KeyDid;
///
/// let kp = Ed25519Keypair::from_seed(&[1u8; 32]);
/// let did = KeyDid::from_public_key(&kp.public_key());
/// assert!(did.to_string().starts_with("did:key:z6Mk"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyDid {
    public_key: PublicKey,
}

impl KeyDid {
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self {
            public_key: *public_key,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The full DID string.
    pub fn to_did_string(&self) -> String {
        format!("did:{}:{}", KEY_DID_METHOD, ed25519_multibase(&self.public_key))
    }

    /// DID URL of the single verification method. For `did:key` the
    /// fragment repeats the multibase key.
    pub fn key_id(&self) -> String {
        let multibase = ed25519_multibase(&self.public_key);
        format!("did:{}:{}#{}", KEY_DID_METHOD, multibase, multibase)
    }

    /// Parse a `did:key` string. Fragments and queries are not accepted.
    pub fn parse(did: &str) -> Result<Self, DidError> {
        let (method, id) = split_did(did)?;
        if method != KEY_DID_METHOD {
            return Err(DidError::UnsupportedMethod(method.to_string()));
        }
        if id.contains(['#', '?', '/']) {
            return Err(DidError::InvalidFormat(
                "did:key must not carry a path, query or fragment".into(),
            ));
        }
        Ok(Self {
            public_key: decode_ed25519_multibase(id)?,
        })
    }

    /// Expand into a DID Document. Deterministic: same key, same document.
    pub fn to_did_document(&self) -> DidDocument {
        let did_string = self.to_did_string();
        let key_id = self.key_id();

        DidDocument {
            context: vec![DID_CONTEXT.to_string(), ED25519_CONTEXT.to_string()],
            id: did_string.clone(),
            verification_method: vec![VerificationMethod {
                id: key_id.clone(),
                type_: VERIFICATION_KEY_TYPE.to_string(),
                controller: did_string,
                public_key_multibase: ed25519_multibase(&self.public_key),
            }],
            authentication: vec![key_id.clone()],
            assertion_method: vec![key_id],
        }
    }
}

impl fmt::Display for KeyDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_did_string())
    }
}

impl FromStr for KeyDid {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// DID Document Types
// ---------------------------------------------------------------------------

/// A W3C DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// JSON-LD context URIs.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The DID this document describes.
    pub id: String,

    #[serde(rename = "verificationMethod")]
    pub verification_method: Vec<VerificationMethod>,

    /// Verification method ids usable for authentication.
    pub authentication: Vec<String>,

    #[serde(rename = "assertionMethod")]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    pub fn to_json(&self) -> Result<String, DidError> {
        serde_json::to_string_pretty(self).map_err(|e| DidError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, DidError> {
        serde_json::from_str(json).map_err(|e| DidError::Serialization(e.to_string()))
    }

    /// Look up an authentication-capable verification method by its id.
    pub fn authentication_method(&self, key_id: &str) -> Option<&VerificationMethod> {
        if !self.authentication.iter().any(|id| id == key_id) {
            return None;
        }
        self.verification_method.iter().find(|vm| vm.id == key_id)
    }

    /// Structural checks: DID id, DID Core context, and at least one
    /// verification method referenced from `authentication`.
    pub fn validate(&self) -> Result<(), DidError> {
        split_did(&self.id)?;

        if !self.context.iter().any(|c| c == DID_CONTEXT) {
            return Err(DidError::InvalidFormat(
                "document must include DID Core context".into(),
            ));
        }

        if self.verification_method.is_empty() {
            return Err(DidError::InvalidFormat(
                "document must have at least one verification method".into(),
            ));
        }

        if self.authentication.is_empty() {
            return Err(DidError::InvalidFormat(
                "document must have at least one authentication method".into(),
            ));
        }

        Ok(())
    }
}

/// A verification method entry in a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// DID URL of this method.
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    /// The DID that controls this method.
    pub controller: String,

    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: String,
}

impl VerificationMethod {
    /// Decode the Ed25519 public key carried by this method.
    pub fn public_key(&self) -> Result<PublicKey, DidError> {
        if self.type_ != VERIFICATION_KEY_TYPE {
            return Err(DidError::InvalidKey(format!(
                "unsupported verification method type '{}'",
                self.type_
            )));
        }
        decode_ed25519_multibase(&self.public_key_multibase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Ed25519Keypair;

    fn did_for(seed: u8) -> KeyDid {
        KeyDid::from_public_key(&Ed25519Keypair::from_seed(&[seed; 32]).public_key())
    }

    #[test]
    fn did_string_format() {
        let did = did_for(1);
        assert!(did.to_did_string().starts_with("did:key:z6Mk"));
        assert_eq!(did.to_string(), did.to_did_string());
    }

    #[test]
    fn did_roundtrip_via_string() {
        let did = did_for(2);
        let parsed: KeyDid = did.to_did_string().parse().unwrap();
        assert_eq!(parsed, did);
    }

    #[test]
    fn invalid_prefix_rejected() {
        assert!(matches!(
            KeyDid::parse("notadid:key:z6Mkabc"),
            Err(DidError::InvalidFormat(_))
        ));
        assert!(matches!(
            KeyDid::parse("did:key"),
            Err(DidError::InvalidFormat(_))
        ));
    }

    #[test]
    fn wrong_method_rejected() {
        assert_eq!(
            KeyDid::parse("did:pkh:solana:abc:def"),
            Err(DidError::UnsupportedMethod("pkh".into()))
        );
    }

    #[test]
    fn fragment_rejected() {
        let did = did_for(3);
        assert!(KeyDid::parse(&did.key_id()).is_err());
    }

    #[test]
    fn non_ed25519_multicodec_rejected() {
        // secp256k1-pub multicodec is 0xe7 0x01.
        let mut bytes = vec![0xe7, 0x01];
        bytes.extend_from_slice(&[2u8; 33]);
        let did = format!("did:key:z{}", bs58::encode(bytes).into_string());
        assert!(matches!(KeyDid::parse(&did), Err(DidError::InvalidKey(_))));
    }

    #[test]
    fn document_has_required_fields() {
        let did = did_for(4);
        let doc = did.to_did_document();
        assert!(doc.context.contains(&DID_CONTEXT.to_string()));
        assert_eq!(doc.id, did.to_did_string());
        assert_eq!(doc.verification_method.len(), 1);
        assert_eq!(doc.authentication, vec![did.key_id()]);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn authentication_method_decodes_key() {
        let did = did_for(5);
        let doc = did.to_did_document();
        let vm = doc.authentication_method(&did.key_id()).unwrap();
        assert_eq!(vm.public_key().unwrap(), *did.public_key());
        assert!(doc.authentication_method("did:key:zOther#zOther").is_none());
    }

    #[test]
    fn document_is_deterministic_and_json_roundtrips() {
        let a = did_for(6).to_did_document();
        let b = did_for(6).to_did_document();
        assert_eq!(a, b);
        let json = a.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("@context").is_some());
        assert!(parsed.get("verificationMethod").is_some());
        assert_eq!(DidDocument::from_json(&json).unwrap(), a);
    }

    #[test]
    fn invalid_document_rejected() {
        let doc = DidDocument {
            context: vec![],
            id: "not-a-did".to_string(),
            verification_method: vec![],
            authentication: vec![],
            assertion_method: vec![],
        };
        assert!(doc.validate().is_err());
    }

    #[test]
    fn multibase_encodes_multicodec_prefix() {
        let kp = Ed25519Keypair::from_seed(&[7u8; 32]);
        let multibase = ed25519_multibase(&kp.public_key());
        let decoded = bs58::decode(&multibase[1..]).into_vec().unwrap();
        assert_eq!(&decoded[..2], &[0xed, 0x01]);
        assert_eq!(&decoded[2..], kp.public_key().as_bytes());
        assert_eq!(decode_ed25519_multibase(&multibase).unwrap(), kp.public_key());
    }
}
