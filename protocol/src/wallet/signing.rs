//! # Message Signing Bridge
//!
//! Asks the connected wallet to sign an arbitrary text message. Signing is
//! user-interactive (the wallet may pop up a prompt), so a failed request is
//! reported once and never repeated.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::session::WalletSessionManager;
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::{KeylinkError, Result};

/// A message together with the wallet's signature over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    payload: Vec<u8>,
    signature: Signature,
    signer_public_key: PublicKey,
}

impl SignedMessage {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signer_public_key(&self) -> &PublicKey {
        &self.signer_public_key
    }
}

/// Signs messages through the wallet of a connected session.
#[derive(Debug, Clone, Copy)]
pub struct MessageSigningBridge<'a> {
    session: &'a WalletSessionManager,
}

impl<'a> MessageSigningBridge<'a> {
    pub fn new(session: &'a WalletSessionManager) -> Self {
        Self { session }
    }

    /// Sign the UTF-8 bytes of `message`.
    ///
    /// [`KeylinkError::NotConnected`] is raised before the wallet is
    /// contacted. A declined or failed request, or a signature made with a
    /// key other than the bound one, is [`KeylinkError::SigningRejected`].
    pub async fn sign(&self, message: &str) -> Result<SignedMessage> {
        let (provider, bound_key) = self
            .session
            .connected_provider()
            .ok_or(KeylinkError::NotConnected)?;

        let payload = message.as_bytes().to_vec();
        debug!(signer = %bound_key, len = payload.len(), "requesting wallet signature");

        let signed = provider.sign_message(&payload).await.map_err(|err| {
            warn!(error = %err, "wallet declined to sign");
            KeylinkError::SigningRejected(err.to_string())
        })?;

        if signed.public_key != bound_key {
            warn!(
                bound = %bound_key,
                signer = %signed.public_key,
                "wallet signed with a different account"
            );
            return Err(KeylinkError::SigningRejected(format!(
                "wallet signed with {} but the session is bound to {}",
                signed.public_key, bound_key
            )));
        }

        Ok(SignedMessage {
            payload,
            signature: signed.signature,
            signer_public_key: bound_key,
        })
    }
}
