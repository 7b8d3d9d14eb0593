//! # Local Software Wallet
//!
//! An in-process [`WalletProvider`] backed by an Ed25519 keypair. It plays
//! the part of the browser extension for the CLI and for tests, including
//! the ways a real wallet says no: rejected connections, rejected
//! signatures, and failing disconnects can each be switched on.
//!
//! Request counters let tests assert that nothing was retried.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::provider::{ConnectResponse, ProviderError, ProviderSignature, WalletProvider};
use crate::crypto::keys::{Ed25519Keypair, PublicKey};

/// A software wallet holding one account key.
pub struct LocalWallet {
    keypair: Ed25519Keypair,
    connected: Mutex<bool>,
    reject_connect: bool,
    reject_sign: bool,
    fail_disconnect: bool,
    connect_requests: AtomicUsize,
    sign_requests: AtomicUsize,
}

impl LocalWallet {
    pub fn new(keypair: Ed25519Keypair) -> Self {
        Self {
            keypair,
            connected: Mutex::new(false),
            reject_connect: false,
            reject_sign: false,
            fail_disconnect: false,
            connect_requests: AtomicUsize::new(0),
            sign_requests: AtomicUsize::new(0),
        }
    }

    /// A wallet with a freshly generated account.
    pub fn generate() -> Self {
        Self::new(Ed25519Keypair::generate())
    }

    /// Start out already bound to the application (a wallet that trusts the
    /// site from an earlier visit).
    pub fn already_connected(self) -> Self {
        *self.connected.lock() = true;
        self
    }

    /// Decline every connection request.
    pub fn rejecting_connections(mut self) -> Self {
        self.reject_connect = true;
        self
    }

    /// Decline every signing request.
    pub fn rejecting_signatures(mut self) -> Self {
        self.reject_sign = true;
        self
    }

    /// Error on every disconnect request.
    pub fn failing_disconnects(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// The account key, whether or not it is currently bound.
    pub fn account(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn connect_requests(&self) -> usize {
        self.connect_requests.load(Ordering::SeqCst)
    }

    pub fn sign_requests(&self) -> usize {
        self.sign_requests.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("account", &self.account())
            .field("connected", &*self.connected.lock())
            .finish()
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn connect(&self) -> Result<ConnectResponse, ProviderError> {
        self.connect_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_connect {
            return Err(ProviderError::Rejected("user rejected the request".into()));
        }
        *self.connected.lock() = true;
        Ok(ConnectResponse {
            public_key: self.keypair.public_key(),
        })
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        if self.fail_disconnect {
            return Err(ProviderError::Internal("disconnect failed".into()));
        }
        *self.connected.lock() = false;
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<ProviderSignature, ProviderError> {
        self.sign_requests.fetch_add(1, Ordering::SeqCst);
        if !*self.connected.lock() {
            return Err(ProviderError::Unavailable("wallet is not connected".into()));
        }
        if self.reject_sign {
            return Err(ProviderError::Rejected("user rejected the request".into()));
        }
        Ok(ProviderSignature {
            signature: self.keypair.sign(message),
            public_key: self.keypair.public_key(),
        })
    }

    fn public_key(&self) -> Option<PublicKey> {
        if *self.connected.lock() {
            Some(self.keypair.public_key())
        } else {
            None
        }
    }
}
