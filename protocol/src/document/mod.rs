//! # Document Module
//!
//! Deterministic, identity-controlled data documents.
//!
//! - `id`: the content-derived [`DocumentId`] and the [`GenesisHeader`] it
//!   hashes.
//! - `descriptor`: [`GenesisRequest`], [`DocumentHandle`] and
//!   [`DeterministicDocumentDescriptor`].
//! - `store`: the [`DocumentStore`] trait and its memory, sled and HTTP
//!   implementations.
//! - `provisioner`: [`DocumentProvisioner`], the create-or-fetch entry point.

pub mod descriptor;
pub mod id;
pub mod provisioner;
pub mod store;

pub use descriptor::{DeterministicDocumentDescriptor, DocumentHandle, GenesisRequest};
pub use id::{DocumentId, DocumentIdError, GenesisHeader};
pub use provisioner::{random_family, DocumentProvisioner};
pub use store::{
    DocumentStore, HttpDocumentStore, MemoryDocumentStore, SledDocumentStore, StoreError,
    StoreResult,
};
