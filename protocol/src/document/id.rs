//! # Document Addressing
//!
//! A document's address is a pure function of its genesis header:
//!
//! ```text
//! DocumentId = 'z' || base58btc( 0xce 0x01 || stream_type || sha256(canonical header) )
//! ```
//!
//! The header is canonicalised by serialising it to compact JSON with a
//! fixed field order, so two clients that agree on the controllers and the
//! family always compute the same address without talking to each other.
//! That is what makes a deterministic document rediscoverable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{DOCUMENT_ID_CODEC, MULTIBASE_BASE58BTC, TILE_STREAM_TYPE};
use crate::crypto::hash::sha256_array;

/// Byte length of a document id before multibase encoding.
pub const DOCUMENT_ID_LENGTH: usize = DOCUMENT_ID_CODEC.len() + 1 + 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentIdError {
    #[error("document id must start with multibase prefix 'z'")]
    MissingMultibasePrefix,

    #[error("document id is not valid base58: {0}")]
    Base58(String),

    #[error("document id has wrong length: expected 35 bytes, got {0}")]
    Length(usize),

    #[error("document id has an unknown codec tag")]
    UnknownCodec,
}

/// The genesis header of a document: everything that determines its address.
///
/// Field order here is the canonical order. Do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisHeader {
    pub controllers: Vec<String>,
    pub family: String,
}

impl GenesisHeader {
    /// Compact JSON with declaration-ordered fields.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Address of a document in the store.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    bytes: Vec<u8>,
}

impl DocumentId {
    /// Address of the document with this genesis header.
    pub fn derive(header: &GenesisHeader) -> Self {
        let digest = sha256_array(&header.canonical_bytes());
        let mut bytes = Vec::with_capacity(DOCUMENT_ID_LENGTH);
        bytes.extend_from_slice(&DOCUMENT_ID_CODEC);
        bytes.push(TILE_STREAM_TYPE);
        bytes.extend_from_slice(&digest);
        Self { bytes }
    }

    /// Parse the multibase string form.
    pub fn parse(s: &str) -> Result<Self, DocumentIdError> {
        let encoded = s
            .strip_prefix(MULTIBASE_BASE58BTC)
            .ok_or(DocumentIdError::MissingMultibasePrefix)?;
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| DocumentIdError::Base58(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocumentIdError> {
        if bytes.len() != DOCUMENT_ID_LENGTH {
            return Err(DocumentIdError::Length(bytes.len()));
        }
        if bytes[..DOCUMENT_ID_CODEC.len()] != DOCUMENT_ID_CODEC {
            return Err(DocumentIdError::UnknownCodec);
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn stream_type(&self) -> u8 {
        self.bytes[DOCUMENT_ID_CODEC.len()]
    }

    /// The SHA-256 of the genesis header.
    pub fn digest(&self) -> &[u8] {
        &self.bytes[DOCUMENT_ID_CODEC.len() + 1..]
    }

    pub fn to_multibase(&self) -> String {
        format!(
            "{}{}",
            MULTIBASE_BASE58BTC,
            bs58::encode(&self.bytes).into_string()
        )
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_multibase())
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.to_multibase())
    }
}

impl FromStr for DocumentId {
    type Err = DocumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DocumentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.to_multibase()
    }
}
