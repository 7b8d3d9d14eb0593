//! # Wallet Provider Capability
//!
//! The wallet itself (a browser extension, a hardware device, a test
//! double) lives outside this crate. It is modelled as the capability set
//! every Solana wallet adapter exposes: connect, disconnect, sign a message,
//! and report the currently bound public key.
//!
//! Whether a wallet exists at all is explicit in [`WalletHandle`] rather
//! than an optional handle discovered at runtime. The session manager is
//! handed one at construction and never looks anywhere else.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::crypto::keys::{PublicKey, Signature};

/// Failures reported by a wallet provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The user or the wallet declined the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The wallet is installed but cannot serve requests right now.
    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    /// Anything else the wallet reports.
    #[error("wallet error: {0}")]
    Internal(String),
}

/// Result of a successful `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    pub public_key: PublicKey,
}

/// Result of a successful `sign_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSignature {
    pub signature: Signature,
    pub public_key: PublicKey,
}

/// The capability set of an injected wallet.
///
/// Implementations own their interior state; callers must not invoke
/// `connect` and `disconnect` concurrently.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn connect(&self) -> Result<ConnectResponse, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Sign raw message bytes. May prompt the user.
    async fn sign_message(&self, message: &[u8]) -> Result<ProviderSignature, ProviderError>;

    /// The key the wallet currently has bound to this application, if any.
    fn public_key(&self) -> Option<PublicKey>;
}

/// A wallet provider, or the explicit absence of one.
#[derive(Clone, Default)]
pub enum WalletHandle {
    #[default]
    Absent,
    Present(Arc<dyn WalletProvider>),
}

impl WalletHandle {
    pub fn present<P: WalletProvider + 'static>(provider: P) -> Self {
        WalletHandle::Present(Arc::new(provider))
    }

    pub fn is_present(&self) -> bool {
        matches!(self, WalletHandle::Present(_))
    }

    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        match self {
            WalletHandle::Absent => None,
            WalletHandle::Present(provider) => Some(provider),
        }
    }
}

impl From<Arc<dyn WalletProvider>> for WalletHandle {
    fn from(provider: Arc<dyn WalletProvider>) -> Self {
        WalletHandle::Present(provider)
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletHandle::Absent => f.write_str("WalletHandle::Absent"),
            WalletHandle::Present(provider) => {
                write!(f, "WalletHandle::Present(bound={:?})", provider.public_key())
            }
        }
    }
}
