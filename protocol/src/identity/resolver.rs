//! # DID Resolution
//!
//! A [`ResolverRegistry`] maps DID methods to resolvers and turns a DID into
//! the DID Document used to check authentication responses. The registry is
//! the only thing the authentication handshake trusts for key material.
//!
//! Only `did:key` ships here ([`KeyDidResolver`]); it resolves locally and
//! never touches the network. Additional methods plug in through
//! [`DidResolver`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::key_did::{split_did, DidDocument, KeyDid, KEY_DID_METHOD};

/// Errors raised by resolvers, providers, and the authentication handshake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("no resolver registered for method '{0}'")]
    UnsupportedMethod(String),

    #[error("resolved document is invalid: {0}")]
    InvalidDocument(String),

    #[error("challenge mismatch: {0}")]
    ChallengeMismatch(String),

    #[error("verification method '{0}' not found in authentication relationship")]
    UnknownKey(String),

    #[error("signature does not verify: {0}")]
    InvalidSignature(String),

    #[error("DID provider failed: {0}")]
    Provider(String),
}

/// Resolves DIDs of one method to DID Documents.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// The DID method this resolver handles, e.g. `"key"`.
    fn method(&self) -> &str;

    async fn resolve(&self, did: &str) -> Result<DidDocument, ResolutionError>;
}

/// Resolver for `did:key`. Pure: the document is derived from the DID.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDidResolver;

#[async_trait]
impl DidResolver for KeyDidResolver {
    fn method(&self) -> &str {
        KEY_DID_METHOD
    }

    async fn resolve(&self, did: &str) -> Result<DidDocument, ResolutionError> {
        let key_did = KeyDid::parse(did).map_err(|e| ResolutionError::InvalidDid(e.to_string()))?;
        Ok(key_did.to_did_document())
    }
}

// ---------------------------------------------------------------------------
// ResolverRegistry
// ---------------------------------------------------------------------------

/// Method-name → resolver table.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn DidResolver>>,
}

impl ResolverRegistry {
    /// An empty registry. Resolves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that resolves `did:key`.
    pub fn with_key_did() -> Self {
        Self::new().with_resolver(KeyDidResolver)
    }

    /// Register `resolver` for its method, replacing any previous one.
    pub fn with_resolver<R: DidResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers
            .insert(resolver.method().to_string(), Arc::new(resolver));
        self
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    /// Resolve `did` and check the resolved document describes it.
    pub async fn resolve(&self, did: &str) -> Result<DidDocument, ResolutionError> {
        let (method, _) = split_did(did).map_err(|e| ResolutionError::InvalidDid(e.to_string()))?;
        let resolver = self
            .resolvers
            .get(method)
            .ok_or_else(|| ResolutionError::UnsupportedMethod(method.to_string()))?;

        debug!(method, "resolving DID");
        let document = resolver.resolve(did).await?;

        document
            .validate()
            .map_err(|e| ResolutionError::InvalidDocument(e.to_string()))?;
        if document.id != did {
            return Err(ResolutionError::InvalidDocument(format!(
                "document id '{}' does not match '{}'",
                document.id, did
            )));
        }
        Ok(document)
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}
