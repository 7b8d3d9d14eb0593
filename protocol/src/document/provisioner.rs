//! # Deterministic Document Provisioner
//!
//! Given a controller and a family tag, asks the store for the one document
//! those two inputs address. Running it again with the same pair finds the
//! same document; changing the family finds a different one.
//!
//! The provisioner keeps no cache. Every call goes to the store, and a
//! failed call leaves nothing behind.

use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::descriptor::{DeterministicDocumentDescriptor, GenesisRequest};
use super::store::DocumentStore;
use crate::config::{SolanaNetwork, FAMILY_TAG_LENGTH};
use crate::error::{KeylinkError, Result};
use crate::identity::pkh::ChainScopedController;
use crate::wallet::session::WalletSessionManager;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A fresh family tag: three lowercase base-36 characters.
///
/// Callers are expected to persist the tag and pass it back on later runs.
/// The provisioner itself never picks one.
pub fn random_family() -> String {
    let mut rng = rand::thread_rng();
    (0..FAMILY_TAG_LENGTH)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Provisions deterministic documents in a [`DocumentStore`].
#[derive(Clone)]
pub struct DocumentProvisioner {
    store: Arc<dyn DocumentStore>,
}

impl DocumentProvisioner {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create or fetch the document controlled by `controller` in `family`.
    ///
    /// `controller` must be a `did:pkh` string
    /// ([`KeylinkError::InvalidController`]) and `family` must not be empty
    /// ([`KeylinkError::InvalidFamily`]). Both are checked before the store
    /// is contacted.
    pub async fn provision(
        &self,
        controller: &str,
        family: &str,
    ) -> Result<DeterministicDocumentDescriptor> {
        let controller = ChainScopedController::parse(controller)
            .map_err(|e| KeylinkError::InvalidController(e.to_string()))?;
        self.provision_controller(controller, family).await
    }

    /// Provision for the wallet bound to `session` on `network`.
    pub async fn provision_for_session(
        &self,
        session: &WalletSessionManager,
        network: SolanaNetwork,
        family: &str,
    ) -> Result<DeterministicDocumentDescriptor> {
        let public_key = session
            .bound_public_key()
            .ok_or(KeylinkError::WalletNotConnected)?;
        let controller = ChainScopedController::solana(network, &public_key);
        self.provision_controller(controller, family).await
    }

    async fn provision_controller(
        &self,
        controller: ChainScopedController,
        family: &str,
    ) -> Result<DeterministicDocumentDescriptor> {
        if family.trim().is_empty() {
            return Err(KeylinkError::InvalidFamily(
                "family tag must not be empty".into(),
            ));
        }

        let request = GenesisRequest::deterministic(vec![controller], family);
        debug!(
            store = self.store.name(),
            controller = %request.controllers[0],
            family,
            "provisioning deterministic document"
        );

        let handle = self
            .store
            .create_deterministic(&request)
            .await
            .map_err(|e| {
                warn!(store = self.store.name(), error = %e, "document store failed");
                KeylinkError::StoreUnavailable(e.to_string())
            })?;

        let descriptor = DeterministicDocumentDescriptor::new(&request, handle);
        info!(
            document = %descriptor.document_id,
            stream = %descriptor.stream_id,
            family,
            "document provisioned"
        );
        Ok(descriptor)
    }
}

impl std::fmt::Debug for DocumentProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentProvisioner")
            .field("store", &self.store.name())
            .finish()
    }
}
