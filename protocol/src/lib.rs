// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # keylink: Wallet-Rooted Identity Linking
//!
//! Binds a user's wallet key to a decentralized identity and provisions a
//! data document whose address anyone can recompute from the same inputs.
//! No account server, no custody: the wallet signs, the identity network
//! verifies, the document store stores.
//!
//! ## Flow
//!
//! ```text
//! connect ──► sign / build credential ──► provision ──► disconnect
//!    │                                        ▲
//!    └──── bound key ─── did:pkh controller ──┘
//!
//! fixed seed ──► did:key application identity (independent of the wallet)
//! ```
//!
//! ## Modules
//!
//! - **config**: chain references, the deployment seed, encoding tags.
//! - **error**: [`KeylinkError`], the one error type callers see.
//! - **crypto**: Ed25519 and SHA-256 wrappers.
//! - **identity**: `did:key`, `did:pkh`, resolvers and seed identities.
//! - **wallet**: the wallet capability, session manager, signing bridge and
//!   wallet-rooted credentials.
//! - **document**: deterministic addressing, stores and the provisioner.
//!
//! Every operation is terminal on failure. Nothing here retries, and nothing
//! here holds state beyond the wallet session.

pub mod config;
pub mod crypto;
pub mod document;
pub mod error;
pub mod identity;
pub mod wallet;

pub use config::{KeylinkConfig, SolanaNetwork};
pub use document::{DeterministicDocumentDescriptor, DocumentId, DocumentProvisioner};
pub use error::{KeylinkError, Result};
pub use identity::{ChainScopedController, FixedSeed, SeedIdentity, SeedIdentityAuthenticator};
pub use wallet::{
    AuthCredential, LocalWallet, MessageSigningBridge, WalletAuthProvider, WalletHandle,
    WalletSessionManager,
};
