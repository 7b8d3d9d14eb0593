//! # Seed-Derived Application Identity
//!
//! The application has its own identity, separate from any user's wallet:
//! a `did:key` derived from a 32-byte seed fixed at deployment time. The
//! authenticator sequences derive keypair → authenticate through the
//! resolver → expose the identifier, and nothing else.
//!
//! Derivation has no randomness and no clock dependence in the identifier.
//! The handshake nonce is random, but it never reaches the result.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::provider::{Did, Ed25519Provider};
use super::resolver::ResolverRegistry;
use crate::config::{DEPLOYMENT_SEED, SEED_LENGTH};
use crate::error::{KeylinkError, Result};

/// A 32-byte identity seed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedSeed([u8; SEED_LENGTH]);

impl FixedSeed {
    pub const fn new(bytes: [u8; SEED_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The seed compiled into this deployment.
    pub const fn deployment() -> Self {
        Self(DEPLOYMENT_SEED)
    }

    /// Parse a hex-encoded seed. `None` unless it is exactly 32 bytes.
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let bytes = hex::decode(hex_str.trim()).ok()?;
        let arr: [u8; SEED_LENGTH] = bytes.as_slice().try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }
}

impl Default for FixedSeed {
    fn default() -> Self {
        Self::deployment()
    }
}

impl fmt::Debug for FixedSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FixedSeed(<redacted>)")
    }
}

/// The authenticated application identity.
///
/// Not a controller: it never appears inside a `did:pkh` and carries no
/// chain scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedIdentity {
    seed: FixedSeed,
    derived_identifier: String,
}

impl SeedIdentity {
    pub fn seed(&self) -> &FixedSeed {
        &self.seed
    }

    /// The `did:key` identifier.
    pub fn derived_identifier(&self) -> &str {
        &self.derived_identifier
    }
}

/// Authenticates the seed-derived identity against a resolver registry.
#[derive(Debug, Clone)]
pub struct SeedIdentityAuthenticator {
    resolver: ResolverRegistry,
}

impl SeedIdentityAuthenticator {
    pub fn new(resolver: ResolverRegistry) -> Self {
        Self { resolver }
    }

    /// Derive and authenticate the identity for `seed`.
    ///
    /// Resolver failures surface as [`KeylinkError::AuthenticationFailed`];
    /// nothing is retried.
    pub async fn authenticate(&self, seed: &FixedSeed) -> Result<SeedIdentity> {
        let provider = Arc::new(Ed25519Provider::from_seed(seed.as_bytes()));
        debug!(provider = ?provider, "authenticating seed identity");

        let mut did = Did::new(provider, self.resolver.clone());
        let derived_identifier = did.authenticate().await.map_err(|e| {
            warn!(error = %e, "seed identity authentication failed");
            KeylinkError::AuthenticationFailed(e.to_string())
        })?;

        Ok(SeedIdentity {
            seed: *seed,
            derived_identifier,
        })
    }
}

impl Default for SeedIdentityAuthenticator {
    fn default() -> Self {
        Self::new(ResolverRegistry::with_key_did())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deployment_seed_yields_key_did() {
        let authenticator = SeedIdentityAuthenticator::default();
        let identity = authenticator
            .authenticate(&FixedSeed::deployment())
            .await
            .unwrap();
        assert_eq!(
            identity.derived_identifier(),
            "did:key:z6MkvQizLyzkqTRyXB7bf67P7vVAYu61UzKNZDnyK6HaF5ju"
        );
    }

    #[tokio::test]
    async fn same_seed_same_identifier() {
        let authenticator = SeedIdentityAuthenticator::default();
        let seed = FixedSeed::deployment();
        let first = authenticator.authenticate(&seed).await.unwrap();
        let second = authenticator.authenticate(&seed).await.unwrap();
        assert_eq!(first.derived_identifier(), second.derived_identifier());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fresh_authenticator_agrees() {
        let seed = FixedSeed::new([9u8; 32]);
        let a = SeedIdentityAuthenticator::default()
            .authenticate(&seed)
            .await
            .unwrap();
        let b = SeedIdentityAuthenticator::new(ResolverRegistry::with_key_did())
            .authenticate(&seed)
            .await
            .unwrap();
        assert_eq!(a.derived_identifier(), b.derived_identifier());
    }

    #[tokio::test]
    async fn different_seeds_differ() {
        let authenticator = SeedIdentityAuthenticator::default();
        let a = authenticator
            .authenticate(&FixedSeed::new([1u8; 32]))
            .await
            .unwrap();
        let b = authenticator
            .authenticate(&FixedSeed::new([2u8; 32]))
            .await
            .unwrap();
        assert_ne!(a.derived_identifier(), b.derived_identifier());
    }

    #[tokio::test]
    async fn resolver_failure_is_authentication_failed() {
        let authenticator = SeedIdentityAuthenticator::new(ResolverRegistry::new());
        let err = authenticator
            .authenticate(&FixedSeed::deployment())
            .await
            .unwrap_err();
        assert!(matches!(err, KeylinkError::AuthenticationFailed(_)));
    }

    #[test]
    fn seed_hex_parsing_and_redaction() {
        let seed = FixedSeed::from_hex(&hex::encode(DEPLOYMENT_SEED)).unwrap();
        assert_eq!(seed, FixedSeed::deployment());
        assert!(FixedSeed::from_hex("abcd").is_none());
        assert_eq!(format!("{:?}", seed), "FixedSeed(<redacted>)");
    }
}
