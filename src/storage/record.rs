//! Persistent Backend Record
//!
//! The durable snapshot of a backend. Records are plain values: they are
//! rebuilt from a [`Backend`](super::Backend) whenever it changes and are
//! never patched in place.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;

/// Schema version stamped on newly constructed records
pub const DEFAULT_SCHEMA_VERSION: &str = "1";

/// Durable snapshot of a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentBackendRecord {
    /// Human-assigned backend name
    pub backend_name: String,
    /// Backend identity; empty until assigned by the orchestrator
    pub backend_uuid: String,
    /// Whether the backend was reachable when the record was taken
    pub online: bool,
    /// Record schema version
    pub version: String,
    /// Driver configuration as encoded by the driver
    pub config: Vec<u8>,
}

impl PersistentBackendRecord {
    /// Decode the driver configuration payload into the driver's own type
    pub fn config_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.config).map_err(|e| {
            Error::Decode(format!(
                "config of backend {} does not match the driver schema: {}",
                self.backend_name, e
            ))
        })
    }

    /// Whether the orchestrator has assigned an identity yet
    pub fn has_uuid(&self) -> bool {
        !self.backend_uuid.is_empty()
    }
}
