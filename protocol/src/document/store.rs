//! # Document Stores
//!
//! The network that actually holds documents is an external collaborator.
//! All the provisioner needs from it is one operation: given a genesis
//! request, create the document or return the one that already exists at
//! that address.
//!
//! Three implementations:
//!
//! | Store                 | Backing                       | Use                       |
//! |-----------------------|-------------------------------|---------------------------|
//! | `MemoryDocumentStore` | `RwLock<HashMap>`             | tests, dry runs           |
//! | `SledDocumentStore`   | sled tree `documents`         | local persistent node     |
//! | `HttpDocumentStore`   | `POST /api/v0/streams`        | remote document-store node|
//!
//! ## Sled layout
//!
//! | Tree        | Key                    | Value                    |
//! |-------------|------------------------|--------------------------|
//! | `documents` | document id (35 bytes) | `bincode(StoredDocument)`|
//!
//! Create-or-fetch is a single `compare_and_swap(key, None, Some(record))`,
//! so two racing creators of the same document end up with one record and
//! the same creation time.
//!
//! Local stores name a document by its derived [`DocumentId`]. A remote node
//! names it however it likes, and that name is passed through untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::descriptor::{DocumentHandle, GenesisRequest};
use super::id::{DocumentId, GenesisHeader};
use crate::config::DOCUMENT_STORE_STREAMS_PATH;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unreachable: {0}")]
    Unavailable(String),

    /// The store answered but refused the request.
    #[error("store rejected request: {0}")]
    Rejected(String),

    /// A stored record or a response could not be decoded.
    #[error("corrupt store data: {0}")]
    Corrupt(String),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where documents get created.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Create the document described by `request`, or return the existing
    /// one if its address is already taken.
    async fn create_deterministic(&self, request: &GenesisRequest) -> StoreResult<DocumentHandle>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// A process-local store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, DocumentHandle>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    pub fn get(&self, id: &DocumentId) -> Option<DocumentHandle> {
        self.documents.read().get(id).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_deterministic(&self, request: &GenesisRequest) -> StoreResult<DocumentHandle> {
        let id = request.document_id();
        let handle = self
            .documents
            .write()
            .entry(id.clone())
            .or_insert_with(|| DocumentHandle {
                stream_id: id.to_string(),
                created_at: Utc::now(),
            })
            .clone();
        Ok(handle)
    }
}

// ---------------------------------------------------------------------------
// Sled
// ---------------------------------------------------------------------------

/// On-disk form of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDocument {
    header: GenesisHeader,
    created_at: DateTime<Utc>,
}

/// A persistent store on an embedded sled database.
#[derive(Debug, Clone)]
pub struct SledDocumentStore {
    db: sled::Db,
    documents: sled::Tree,
}

impl SledDocumentStore {
    /// Open or create a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store that lives only as long as the handle.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StoreResult<Self> {
        let documents = db.open_tree("documents")?;
        Ok(Self { db, documents })
    }

    /// Look up a document without creating it.
    pub fn get(&self, id: &DocumentId) -> StoreResult<Option<DocumentHandle>> {
        match self.documents.get(id.as_bytes())? {
            Some(bytes) => {
                let stored = decode_record(&bytes)?;
                Ok(Some(DocumentHandle {
                    stream_id: id.to_string(),
                    created_at: stored.created_at,
                }))
            }
            None => Ok(None),
        }
    }

    /// The genesis header stored under `id`.
    pub fn header(&self, id: &DocumentId) -> StoreResult<Option<GenesisHeader>> {
        match self.documents.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode_record(&bytes)?.header)),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub async fn flush(&self) -> StoreResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

fn decode_record(bytes: &[u8]) -> StoreResult<StoredDocument> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl DocumentStore for SledDocumentStore {
    fn name(&self) -> &'static str {
        "sled"
    }

    async fn create_deterministic(&self, request: &GenesisRequest) -> StoreResult<DocumentHandle> {
        let id = request.document_id();
        let record = StoredDocument {
            header: request.header(),
            created_at: Utc::now(),
        };
        let encoded =
            bincode::serialize(&record).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let created_at = match self.documents.compare_and_swap(
            id.as_bytes(),
            None as Option<&[u8]>,
            Some(encoded),
        )? {
            Ok(()) => {
                debug!(document = %id, "stored new document");
                record.created_at
            }
            Err(existing) => {
                let current = existing
                    .current
                    .ok_or_else(|| StoreError::Corrupt("record vanished during swap".into()))?;
                debug!(document = %id, "document already present");
                decode_record(&current)?.created_at
            }
        };
        self.documents.flush_async().await?;

        Ok(DocumentHandle {
            stream_id: id.to_string(),
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateStreamRequest<'a> {
    #[serde(rename = "type")]
    stream_type: u8,
    genesis: GenesisEnvelope<'a>,
    opts: CreateOpts,
}

#[derive(Debug, Serialize)]
struct GenesisEnvelope<'a> {
    header: &'a GenesisHeader,
}

#[derive(Debug, Serialize)]
struct CreateOpts {
    anchor: bool,
    publish: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateStreamResponse {
    stream_id: String,
}

/// A remote document-store node reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDocumentStore {
    /// A store for the node at `base_url` (e.g. `http://localhost:7007`).
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        let endpoint = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            DOCUMENT_STORE_STREAMS_PATH
        );
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn create_deterministic(&self, request: &GenesisRequest) -> StoreResult<DocumentHandle> {
        let header = request.header();
        let body = CreateStreamRequest {
            stream_type: crate::config::TILE_STREAM_TYPE,
            genesis: GenesisEnvelope { header: &header },
            opts: CreateOpts {
                anchor: false,
                publish: false,
            },
        };

        debug!(endpoint = %self.endpoint, family = %header.family, "creating stream");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "document store refused stream creation");
            return Err(StoreError::Rejected(format!("{status}: {detail}")));
        }

        let parsed: CreateStreamResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if parsed.stream_id.trim().is_empty() {
            return Err(StoreError::Corrupt("empty stream id".into()));
        }

        info!(stream = %parsed.stream_id, address = %request.document_id(), "stream created");
        Ok(DocumentHandle {
            stream_id: parsed.stream_id,
            created_at: Utc::now(),
        })
    }
}
