//! # Wallet Session Manager
//!
//! Owns the one [`WalletSession`] of a client and is the only place the bound
//! wallet key can be read from. The signing bridge, the authentication
//! provider and the document provisioner all borrow the manager rather than
//! caching the key themselves, so a disconnect is immediately visible to
//! every one of them.
//!
//! ## State machine
//!
//! ```text
//!                connect() ok
//!   Disconnected ────────────────► Connected(key)
//!        ▲                              │
//!        └──────────────────────────────┘
//!                disconnect() ok
//! ```
//!
//! A failed `connect` leaves the session `Disconnected`, even when it was
//! `Connected` before the attempt; a failed `disconnect` leaves it
//! `Connected`. `connect`/`disconnect` take
//! `&mut self`, so the borrow checker rules out concurrent transitions.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::provider::{ProviderError, WalletHandle, WalletProvider};
use crate::crypto::keys::PublicKey;
use crate::error::{KeylinkError, Result};

/// Connection state of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connected,
}

/// Snapshot of the wallet session. `bound_public_key` is `Some` exactly
/// when `status` is `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WalletSession {
    bound_public_key: Option<PublicKey>,
    status: SessionStatus,
}

impl WalletSession {
    fn connected(public_key: PublicKey) -> Self {
        Self {
            bound_public_key: Some(public_key),
            status: SessionStatus::Connected,
        }
    }

    pub fn bound_public_key(&self) -> Option<&PublicKey> {
        self.bound_public_key.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }
}

/// Tracks connect/disconnect of an injected wallet provider.
#[derive(Debug)]
pub struct WalletSessionManager {
    wallet: WalletHandle,
    session: WalletSession,
}

impl WalletSessionManager {
    /// A manager for `wallet`, starting `Disconnected`.
    pub fn new(wallet: WalletHandle) -> Self {
        Self {
            wallet,
            session: WalletSession::default(),
        }
    }

    pub fn session(&self) -> WalletSession {
        self.session
    }

    pub fn bound_public_key(&self) -> Option<PublicKey> {
        self.session.bound_public_key
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_present()
    }

    /// Ask the wallet to connect and bind its key.
    ///
    /// Fails with [`KeylinkError::WalletUnavailable`] when no wallet was
    /// injected (or the wallet reports itself unavailable) and with
    /// [`KeylinkError::ConnectionRejected`] when it declines. The session is
    /// left `Disconnected` on any failure, including a failed reconnect of a
    /// live session; the provider may still hold its own binding, which
    /// [`resume`](Self::resume) can adopt.
    pub async fn connect(&mut self) -> Result<WalletSession> {
        let provider = self
            .wallet
            .provider()
            .ok_or(KeylinkError::WalletUnavailable)?;

        debug!("requesting wallet connection");
        match provider.connect().await {
            Ok(response) => {
                self.session = WalletSession::connected(response.public_key);
                info!(public_key = %response.public_key, "wallet connected");
                Ok(self.session)
            }
            Err(err) => {
                warn!(error = %err, "wallet connection failed");
                self.session = WalletSession::default();
                Err(match err {
                    ProviderError::Unavailable(_) => KeylinkError::WalletUnavailable,
                    ProviderError::Rejected(reason) | ProviderError::Internal(reason) => {
                        KeylinkError::ConnectionRejected(reason)
                    }
                })
            }
        }
    }

    /// Ask the wallet to disconnect and clear the bound key.
    ///
    /// On failure the session keeps its current state and the error is
    /// returned as [`KeylinkError::DisconnectFailed`].
    pub async fn disconnect(&mut self) -> Result<()> {
        let provider = self
            .wallet
            .provider()
            .ok_or(KeylinkError::WalletUnavailable)?;

        debug!("requesting wallet disconnect");
        provider.disconnect().await.map_err(|err| {
            warn!(error = %err, "wallet disconnect failed, keeping session");
            KeylinkError::DisconnectFailed(err.to_string())
        })?;

        self.session = WalletSession::default();
        info!("wallet disconnected");
        Ok(())
    }

    /// Adopt a binding the wallet already holds, without prompting.
    ///
    /// Returns `None` (and changes nothing) when there is no wallet or the
    /// wallet has no key bound.
    pub fn resume(&mut self) -> Option<WalletSession> {
        let public_key = self.wallet.provider()?.public_key()?;
        self.session = WalletSession::connected(public_key);
        info!(public_key = %public_key, "resumed existing wallet session");
        Some(self.session)
    }

    /// The provider and bound key of a connected session.
    pub(crate) fn connected_provider(&self) -> Option<(Arc<dyn WalletProvider>, PublicKey)> {
        let public_key = self.session.bound_public_key?;
        let provider = self.wallet.provider()?;
        Some((Arc::clone(provider), public_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::local::LocalWallet;
    use crate::wallet::provider::{ConnectResponse, ProviderSignature};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Accepts connections until `refuse` is set, then keeps its binding but
    /// declines further requests.
    struct FlakyWallet {
        inner: LocalWallet,
        refuse: AtomicBool,
    }

    #[async_trait]
    impl WalletProvider for FlakyWallet {
        async fn connect(&self) -> std::result::Result<ConnectResponse, ProviderError> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(ProviderError::Rejected("user rejected the request".into()));
            }
            self.inner.connect().await
        }

        async fn disconnect(&self) -> std::result::Result<(), ProviderError> {
            self.inner.disconnect().await
        }

        async fn sign_message(
            &self,
            message: &[u8],
        ) -> std::result::Result<ProviderSignature, ProviderError> {
            self.inner.sign_message(message).await
        }

        fn public_key(&self) -> Option<PublicKey> {
            self.inner.public_key()
        }
    }

    fn manager_with(wallet: LocalWallet) -> (WalletSessionManager, Arc<LocalWallet>) {
        let wallet = Arc::new(wallet);
        let handle = WalletHandle::Present(wallet.clone());
        (WalletSessionManager::new(handle), wallet)
    }

    #[tokio::test]
    async fn connect_binds_public_key() {
        let (mut manager, wallet) = manager_with(LocalWallet::generate());
        assert!(!manager.is_connected());

        let session = manager.connect().await.unwrap();
        assert_eq!(session.status(), SessionStatus::Connected);
        assert_eq!(session.bound_public_key(), Some(&wallet.account()));
        assert_eq!(manager.bound_public_key(), Some(wallet.account()));
    }

    #[tokio::test]
    async fn connect_without_wallet_is_unavailable() {
        let mut manager = WalletSessionManager::new(WalletHandle::Absent);
        assert!(matches!(
            manager.connect().await,
            Err(KeylinkError::WalletUnavailable)
        ));
        assert_eq!(manager.session(), WalletSession::default());
    }

    #[tokio::test]
    async fn rejected_connect_leaves_session_disconnected() {
        let (mut manager, wallet) = manager_with(LocalWallet::generate().rejecting_connections());
        assert!(matches!(
            manager.connect().await,
            Err(KeylinkError::ConnectionRejected(_))
        ));
        assert!(!manager.is_connected());
        assert!(manager.bound_public_key().is_none());
        assert_eq!(wallet.connect_requests(), 1);
    }

    #[tokio::test]
    async fn failed_reconnect_drops_live_session() {
        let wallet = Arc::new(FlakyWallet {
            inner: LocalWallet::generate(),
            refuse: AtomicBool::new(false),
        });
        let mut manager = WalletSessionManager::new(WalletHandle::Present(wallet.clone()));
        manager.connect().await.unwrap();
        assert!(manager.is_connected());

        wallet.refuse.store(true, Ordering::SeqCst);
        assert!(matches!(
            manager.connect().await,
            Err(KeylinkError::ConnectionRejected(_))
        ));
        assert_eq!(manager.session(), WalletSession::default());
        assert!(manager.connected_provider().is_none());

        // The wallet kept its binding, so it can be adopted again.
        assert_eq!(wallet.public_key(), Some(wallet.inner.account()));
        assert!(manager.resume().is_some());
        assert_eq!(manager.bound_public_key(), Some(wallet.inner.account()));
    }

    #[tokio::test]
    async fn disconnect_clears_key() {
        let (mut manager, _wallet) = manager_with(LocalWallet::generate());
        manager.connect().await.unwrap();
        manager.disconnect().await.unwrap();
        assert_eq!(manager.session().status(), SessionStatus::Disconnected);
        assert!(manager.bound_public_key().is_none());
        assert!(manager.connected_provider().is_none());
    }

    #[tokio::test]
    async fn failed_disconnect_keeps_session() {
        let (mut manager, wallet) = manager_with(LocalWallet::generate().failing_disconnects());
        manager.connect().await.unwrap();
        assert!(matches!(
            manager.disconnect().await,
            Err(KeylinkError::DisconnectFailed(_))
        ));
        assert!(manager.is_connected());
        assert_eq!(manager.bound_public_key(), Some(wallet.account()));
    }

    #[tokio::test]
    async fn disconnect_without_wallet_is_unavailable() {
        let mut manager = WalletSessionManager::new(WalletHandle::default());
        assert!(matches!(
            manager.disconnect().await,
            Err(KeylinkError::WalletUnavailable)
        ));
    }

    #[test]
    fn resume_adopts_existing_binding() {
        let (mut manager, wallet) = manager_with(LocalWallet::generate().already_connected());
        let session = manager.resume().unwrap();
        assert!(session.is_connected());
        assert_eq!(manager.bound_public_key(), Some(wallet.account()));
        assert_eq!(wallet.connect_requests(), 0);
    }

    #[test]
    fn resume_without_binding_is_noop() {
        let (mut manager, _wallet) = manager_with(LocalWallet::generate());
        assert!(manager.resume().is_none());
        assert!(!manager.is_connected());
    }
}
