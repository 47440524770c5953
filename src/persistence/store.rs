//! Backend Store Port
//!
//! The store owns all I/O: records are translated to envelopes right before
//! a write and back right after a read.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::crd::{sanitize_name, BACKEND_KIND};
use crate::error::{Error, Result};
use crate::persistence::translator::{decode_envelope, encode_envelope, from_envelope, to_envelope};
use crate::storage::PersistentBackendRecord;

// =============================================================================
// BackendStore Trait
// =============================================================================

/// Durable storage for backend records
#[async_trait]
pub trait BackendStore: Send + Sync {
    /// Persist a new backend; fails if one with the same resource name exists
    async fn add_backend(&self, record: &PersistentBackendRecord) -> Result<()>;

    /// Load a backend by its human-assigned name
    async fn get_backend(&self, backend_name: &str) -> Result<PersistentBackendRecord>;

    /// Replace an existing backend
    async fn update_backend(&self, record: &PersistentBackendRecord) -> Result<()>;

    /// Remove a backend
    async fn delete_backend(&self, backend_name: &str) -> Result<()>;

    /// Load every persisted backend
    async fn list_backends(&self) -> Result<Vec<PersistentBackendRecord>>;
}

pub(crate) fn not_found(name: &str) -> Error {
    Error::ResourceNotFound {
        kind: BACKEND_KIND.to_string(),
        name: name.to_string(),
    }
}

pub(crate) fn already_exists(name: &str) -> Error {
    Error::ResourceExists {
        kind: BACKEND_KIND.to_string(),
        name: name.to_string(),
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Store keeping encoded envelopes in memory, keyed by resource name.
///
/// Used in standalone mode and tests; it goes through the same byte encoding
/// a real store would.
#[derive(Debug, Default)]
pub struct InMemoryBackendStore {
    envelopes: DashMap<String, Vec<u8>>,
}

impl InMemoryBackendStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored backends
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Overwrite the raw bytes stored under a resource name
    pub fn insert_raw(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.envelopes.insert(name.into(), bytes);
    }

    fn encode(record: &PersistentBackendRecord) -> Result<(String, Vec<u8>)> {
        let envelope = to_envelope(record)?;
        let name = envelope.metadata.name.clone().unwrap_or_default();
        Ok((name, encode_envelope(&envelope)?))
    }

    fn decode(bytes: &[u8]) -> Result<PersistentBackendRecord> {
        from_envelope(&decode_envelope(bytes)?)
    }
}

#[async_trait]
impl BackendStore for InMemoryBackendStore {
    async fn add_backend(&self, record: &PersistentBackendRecord) -> Result<()> {
        let (name, bytes) = Self::encode(record)?;
        match self.envelopes.entry(name) {
            Entry::Occupied(entry) => Err(already_exists(entry.key())),
            Entry::Vacant(entry) => {
                debug!("Stored backend {} as {}", record.backend_name, entry.key());
                entry.insert(bytes);
                Ok(())
            }
        }
    }

    async fn get_backend(&self, backend_name: &str) -> Result<PersistentBackendRecord> {
        let name = sanitize_name(backend_name)?;
        let bytes = self
            .envelopes
            .get(&name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(&name))?;
        Self::decode(&bytes)
    }

    async fn update_backend(&self, record: &PersistentBackendRecord) -> Result<()> {
        let (name, bytes) = Self::encode(record)?;
        match self.envelopes.get_mut(&name) {
            Some(mut entry) => {
                *entry = bytes;
                Ok(())
            }
            None => Err(not_found(&name)),
        }
    }

    async fn delete_backend(&self, backend_name: &str) -> Result<()> {
        let name = sanitize_name(backend_name)?;
        self.envelopes
            .remove(&name)
            .map(|_| ())
            .ok_or_else(|| not_found(&name))
    }

    async fn list_backends(&self) -> Result<Vec<PersistentBackendRecord>> {
        let mut records = self
            .envelopes
            .iter()
            .map(|entry| Self::decode(entry.value()))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by(|a, b| a.backend_name.cmp(&b.backend_name));
        Ok(records)
    }
}
