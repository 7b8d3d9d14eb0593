//! # Identity Module
//!
//! Two unrelated identities meet here and must never be confused:
//!
//! 1. **Wallet identity**: a `did:pkh` [`ChainScopedController`] naming the
//!    user's wallet account on a chain. Built from a connected wallet
//!    session; it controls documents.
//! 2. **Application identity**: a `did:key` [`SeedIdentity`] derived from
//!    the deployment seed and authenticated through the resolver registry.
//!
//! Layers:
//!
//! - `key_did`: `did:key` encoding and DID Documents.
//! - `pkh`: `did:pkh` controllers and CAIP-10 account ids.
//! - `resolver`: the resolver registry and the `did:key` resolver.
//! - `provider`: DID providers and the challenge/response handshake.
//! - `seed`: the seed-derived identity authenticator.

pub mod key_did;
pub mod pkh;
pub mod provider;
pub mod resolver;
pub mod seed;

pub use key_did::{DidDocument, DidError, KeyDid, VerificationMethod};
pub use pkh::{AccountId, ChainScopedController, ControllerError};
pub use provider::{AuthChallenge, AuthResponse, Did, DidProvider, Ed25519Provider};
pub use resolver::{DidResolver, KeyDidResolver, ResolutionError, ResolverRegistry};
pub use seed::{FixedSeed, SeedIdentity, SeedIdentityAuthenticator};
