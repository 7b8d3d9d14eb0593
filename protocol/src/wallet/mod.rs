//! # Wallet Module
//!
//! Everything that talks to the user's wallet.
//!
//! - `provider`: the [`WalletProvider`] capability trait and [`WalletHandle`].
//! - `local`: [`LocalWallet`], an in-process software wallet.
//! - `session`: [`WalletSessionManager`], the single owner of the bound key.
//! - `signing`: [`MessageSigningBridge`] for arbitrary text messages.
//! - `auth`: [`WalletAuthProvider`] and the [`AuthCredential`] it builds.

pub mod auth;
pub mod local;
pub mod provider;
pub mod session;
pub mod signing;

pub use auth::{AuthCredential, LinkProof, WalletAuthProvider};
pub use local::LocalWallet;
pub use provider::{ConnectResponse, ProviderError, ProviderSignature, WalletHandle, WalletProvider};
pub use session::{SessionStatus, WalletSession, WalletSessionManager};
pub use signing::{MessageSigningBridge, SignedMessage};
