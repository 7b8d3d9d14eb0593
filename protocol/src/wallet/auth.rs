//! # Wallet-Rooted Authentication Provider
//!
//! Turns a connected wallet into an [`AuthCredential`]: the wallet's signing
//! capability, the bound account key, and a fixed chain reference. An
//! identity-resolution service can later check what the credential signs;
//! nothing here verifies anything.
//!
//! The credential can
//!
//! - name its CAIP-10 account and `did:pkh` controller,
//! - derive entropy for a wallet-rooted identity ([`AuthCredential::authenticate`]),
//! - produce a [`LinkProof`] binding the account to another DID
//!   ([`AuthCredential::create_link`]).
//!
//! Every signing call re-checks that the wallet still has the same key
//! bound, so a credential outliving its session fails instead of prompting a
//! different account.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::provider::WalletProvider;
use super::session::WalletSessionManager;
use crate::config::{SolanaNetwork, LINK_MESSAGE_PREFIX, LINK_PROOF_VERSION, SOLANA_NAMESPACE};
use crate::crypto::hash::sha256_hex_prefixed;
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::{KeylinkError, Result};
use crate::identity::pkh::{AccountId, ChainScopedController};

/// Builds credentials from a connected session.
#[derive(Debug, Clone, Copy)]
pub struct WalletAuthProvider<'a> {
    session: &'a WalletSessionManager,
    network: SolanaNetwork,
}

impl<'a> WalletAuthProvider<'a> {
    pub fn new(session: &'a WalletSessionManager, network: SolanaNetwork) -> Self {
        Self { session, network }
    }

    /// Combine the wallet, its bound key and the chain reference.
    ///
    /// Raises [`KeylinkError::WalletNotConnected`] synchronously, before any
    /// wallet call, when the session is not connected.
    pub fn build_credential(&self) -> Result<AuthCredential> {
        let (provider, public_key) = self
            .session
            .connected_provider()
            .ok_or(KeylinkError::WalletNotConnected)?;

        debug!(account = %public_key, network = %self.network, "built wallet credential");
        Ok(AuthCredential {
            provider,
            public_key,
            network: self.network,
        })
    }
}

/// Proof that a wallet account agreed to be linked to a DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProof {
    pub version: u8,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    /// Base58 signature over `message`.
    pub signature: String,
    /// CAIP-10 account id.
    pub account: String,
    /// Unix seconds.
    pub timestamp: i64,
}

/// A wallet-rooted authentication credential.
#[derive(Clone)]
pub struct AuthCredential {
    provider: Arc<dyn WalletProvider>,
    public_key: PublicKey,
    network: SolanaNetwork,
}

impl AuthCredential {
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn network(&self) -> SolanaNetwork {
        self.network
    }

    /// The chain reference carried in the credential's chain scope.
    pub fn chain_reference(&self) -> &'static str {
        self.network.chain_reference()
    }

    pub fn account_id(&self) -> AccountId {
        AccountId::solana(self.network, &self.public_key)
    }

    pub fn controller(&self) -> ChainScopedController {
        ChainScopedController::solana(self.network, &self.public_key)
    }

    /// Sign `message` and return `0x`-prefixed hex SHA-256 of the signature.
    ///
    /// Ed25519 is deterministic, so the same account and message always give
    /// the same entropy.
    pub async fn authenticate(&self, message: &str) -> Result<String> {
        let signature = self.sign(message.as_bytes()).await?;
        Ok(sha256_hex_prefixed(signature.as_bytes()))
    }

    /// Ask the wallet to sign a statement linking this account to `did`.
    pub async fn create_link(&self, did: &str) -> Result<LinkProof> {
        let timestamp = Utc::now().timestamp();
        let message = format!("{LINK_MESSAGE_PREFIX}\n\n{did}\nTimestamp: {timestamp}");
        let signature = self.sign(message.as_bytes()).await?;

        Ok(LinkProof {
            version: LINK_PROOF_VERSION,
            kind: SOLANA_NAMESPACE.to_string(),
            message,
            signature: signature.to_base58(),
            account: self.account_id().to_string(),
            timestamp,
        })
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        if self.provider.public_key() != Some(self.public_key) {
            warn!(account = %self.public_key, "credential used after its session ended");
            return Err(KeylinkError::WalletNotConnected);
        }

        let signed = self
            .provider
            .sign_message(message)
            .await
            .map_err(|err| KeylinkError::SigningRejected(err.to_string()))?;
        if signed.public_key != self.public_key {
            return Err(KeylinkError::SigningRejected(format!(
                "wallet signed with {} instead of {}",
                signed.public_key, self.public_key
            )));
        }
        Ok(signed.signature)
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredential")
            .field("account", &self.account_id().to_string())
            .finish()
    }
}
