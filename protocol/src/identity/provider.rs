//! # DID Providers & Authentication
//!
//! A [`DidProvider`] holds key material for a DID and answers authentication
//! challenges. A [`Did`] handle drives the handshake:
//!
//! 1. issue a fresh [`AuthChallenge`] (random nonce, audience, timestamp),
//! 2. ask the provider to sign its canonical bytes,
//! 3. resolve the responding DID through the [`ResolverRegistry`],
//! 4. verify the signature with the key the document lists under
//!    `authentication`.
//!
//! Only after all four steps does [`Did::id`] return an identifier.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::key_did::KeyDid;
use super::resolver::{ResolutionError, ResolverRegistry};
use crate::crypto::keys::{Ed25519Keypair, Signature};
use crate::crypto::signatures::verify_strict;

/// Audience claimed in challenges issued by this crate.
pub const AUTH_AUDIENCE: &str = "keylink";

/// A challenge the provider must sign to prove control of its DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthChallenge {
    pub nonce: String,
    pub audience: String,
    /// Unix seconds.
    pub issued_at: i64,
}

impl AuthChallenge {
    /// A fresh challenge with a random nonce.
    pub fn new(audience: &str) -> Self {
        Self {
            nonce: Uuid::new_v4().to_string(),
            audience: audience.to_string(),
            issued_at: Utc::now().timestamp(),
        }
    }

    /// The bytes that get signed. Field order is fixed by the struct
    /// definition, so this is stable across processes.
    pub fn signing_input(&self) -> Vec<u8> {
        // Serializing a struct of strings and an integer cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// A provider's answer to an [`AuthChallenge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub did: String,
    /// Verification method used to sign.
    pub kid: String,
    pub nonce: String,
    pub signature: Signature,
}

/// Key material behind a DID.
#[async_trait]
pub trait DidProvider: Send + Sync {
    /// The DID this provider speaks for.
    fn did(&self) -> String;

    async fn authenticate(&self, challenge: &AuthChallenge)
        -> Result<AuthResponse, ResolutionError>;
}

// ---------------------------------------------------------------------------
// Ed25519Provider
// ---------------------------------------------------------------------------

/// A `did:key` provider backed by an in-process Ed25519 keypair.
pub struct Ed25519Provider {
    keypair: Ed25519Keypair,
    did: KeyDid,
}

impl Ed25519Provider {
    pub fn new(keypair: Ed25519Keypair) -> Self {
        let did = KeyDid::from_public_key(&keypair.public_key());
        Self { keypair, did }
    }

    /// Provider for the keypair derived from `seed`.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(Ed25519Keypair::from_seed(seed))
    }
}

impl fmt::Debug for Ed25519Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Provider({})", self.did)
    }
}

#[async_trait]
impl DidProvider for Ed25519Provider {
    fn did(&self) -> String {
        self.did.to_did_string()
    }

    async fn authenticate(
        &self,
        challenge: &AuthChallenge,
    ) -> Result<AuthResponse, ResolutionError> {
        Ok(AuthResponse {
            did: self.did.to_did_string(),
            kid: self.did.key_id(),
            nonce: challenge.nonce.clone(),
            signature: self.keypair.sign(&challenge.signing_input()),
        })
    }
}

// ---------------------------------------------------------------------------
// Did
// ---------------------------------------------------------------------------

/// A DID handle that becomes usable once [`Did::authenticate`] succeeds.
pub struct Did {
    provider: Arc<dyn DidProvider>,
    resolver: ResolverRegistry,
    authenticated: Option<String>,
}

impl Did {
    pub fn new(provider: Arc<dyn DidProvider>, resolver: ResolverRegistry) -> Self {
        Self {
            provider,
            resolver,
            authenticated: None,
        }
    }

    /// Run the challenge/response handshake and return the authenticated id.
    pub async fn authenticate(&mut self) -> Result<String, ResolutionError> {
        let challenge = AuthChallenge::new(AUTH_AUDIENCE);
        let expected_did = self.provider.did();
        debug!(did = %expected_did, "issuing authentication challenge");

        let response = self.provider.authenticate(&challenge).await?;
        if response.nonce != challenge.nonce {
            return Err(ResolutionError::ChallengeMismatch(
                "response nonce does not match the challenge".into(),
            ));
        }
        if response.did != expected_did {
            return Err(ResolutionError::ChallengeMismatch(format!(
                "provider answered for '{}' instead of '{}'",
                response.did, expected_did
            )));
        }

        let document = self.resolver.resolve(&response.did).await?;
        let method = document
            .authentication_method(&response.kid)
            .ok_or_else(|| ResolutionError::UnknownKey(response.kid.clone()))?;
        if method.controller != response.did {
            return Err(ResolutionError::UnknownKey(response.kid.clone()));
        }
        let public_key = method
            .public_key()
            .map_err(|e| ResolutionError::InvalidDocument(e.to_string()))?;

        verify_strict(&public_key, &challenge.signing_input(), &response.signature)
            .map_err(|e| ResolutionError::InvalidSignature(e.to_string()))?;

        info!(did = %response.did, "DID authenticated");
        self.authenticated = Some(response.did.clone());
        Ok(response.did)
    }

    /// The authenticated DID, if the handshake has completed.
    pub fn id(&self) -> Option<&str> {
        self.authenticated.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.is_some()
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Did")
            .field("did", &self.provider.did())
            .field("authenticated", &self.authenticated.is_some())
            .finish()
    }
}
