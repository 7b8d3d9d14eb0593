//! Request and result types of document provisioning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{DocumentId, GenesisHeader};
use crate::identity::pkh::ChainScopedController;

/// What a document store is asked to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisRequest {
    pub deterministic: bool,
    pub family: String,
    pub controllers: Vec<ChainScopedController>,
}

impl GenesisRequest {
    /// A create-or-fetch request: the same controllers and family always
    /// address the same document.
    pub fn deterministic(controllers: Vec<ChainScopedController>, family: impl Into<String>) -> Self {
        Self {
            deterministic: true,
            family: family.into(),
            controllers,
        }
    }

    pub fn header(&self) -> GenesisHeader {
        GenesisHeader {
            controllers: self.controllers.iter().map(|c| c.to_did_string()).collect(),
            family: self.family.clone(),
        }
    }

    /// The address this request resolves to.
    pub fn document_id(&self) -> DocumentId {
        DocumentId::derive(&self.header())
    }
}

/// The opaque handle a document store hands back.
///
/// `stream_id` is whatever the store calls the document. Local stores use
/// the derived [`DocumentId`]; a remote node issues its own identifier
/// (typically a base36 `k...` stream id), which keylink never interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub stream_id: String,
    /// When the store first saw the document. A fetch of an existing
    /// document reports the original creation time.
    pub created_at: DateTime<Utc>,
}

/// A provisioned deterministic document.
///
/// `(controllers, family)` maps to exactly one `document_id`, computed
/// locally. `stream_id` is the store's own name for the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicDocumentDescriptor {
    pub controllers: Vec<ChainScopedController>,
    pub family: String,
    pub deterministic: bool,
    pub document_id: DocumentId,
    pub stream_id: String,
}

impl DeterministicDocumentDescriptor {
    pub fn new(request: &GenesisRequest, handle: DocumentHandle) -> Self {
        Self {
            controllers: request.controllers.clone(),
            family: request.family.clone(),
            deterministic: request.deterministic,
            document_id: request.document_id(),
            stream_id: handle.stream_id,
        }
    }

    /// True when both descriptors address the same document.
    pub fn same_document(&self, other: &Self) -> bool {
        self.document_id == other.document_id
    }
}
