//! Live Backend Objects
//!
//! The orchestrator owns [`Backend`] values; the persistence layer only
//! reads them through the narrow [`BackendSource`] contract.

use crate::error::{Error, Result};
use crate::storage::record::PersistentBackendRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Driver Contract
// =============================================================================

/// A storage driver as seen by the persistence layer.
///
/// Concrete drivers own their configuration type; the bridge only asks them
/// to encode it into an opaque payload.
pub trait StorageDriver: Send + Sync + fmt::Debug {
    /// Driver name (e.g. "ontap-nas")
    fn driver_name(&self) -> &str;

    /// Encode the driver configuration for persistence
    fn encode_config(&self) -> Result<Vec<u8>>;
}

/// Encode a driver configuration as a JSON document.
///
/// Drivers with a `Serialize` config implement
/// [`StorageDriver::encode_config`] with this helper.
pub fn encode_driver_config<T: Serialize + ?Sized>(config: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(config).map_err(|e| Error::Serialization(e.to_string()))
}

// =============================================================================
// Backend
// =============================================================================

/// Operational state of a live backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    Online,
    #[default]
    Offline,
    Deleting,
    Failed,
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendState::Online => write!(f, "online"),
            BackendState::Offline => write!(f, "offline"),
            BackendState::Deleting => write!(f, "deleting"),
            BackendState::Failed => write!(f, "failed"),
        }
    }
}

/// A configured storage target and its driver
#[derive(Debug, Clone)]
pub struct Backend {
    pub name: String,
    pub backend_uuid: String,
    pub online: bool,
    pub state: BackendState,
    pub driver: Arc<dyn StorageDriver>,
}

impl Backend {
    /// Create an offline backend with no assigned identity
    pub fn new(name: impl Into<String>, driver: Arc<dyn StorageDriver>) -> Self {
        Self {
            name: name.into(),
            backend_uuid: String::new(),
            online: false,
            state: BackendState::Offline,
            driver,
        }
    }

    /// Set the identity assigned by the orchestrator
    pub fn with_uuid(mut self, backend_uuid: impl Into<String>) -> Self {
        self.backend_uuid = backend_uuid.into();
        self
    }

    /// Mark the backend online or offline
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
        self.state = if online {
            BackendState::Online
        } else {
            BackendState::Offline
        };
    }

    /// Build the durable record for this backend
    pub fn construct_persistent(&self) -> Result<PersistentBackendRecord> {
        crate::persistence::construct_record(self)
    }
}

// =============================================================================
// Extraction Contract
// =============================================================================

/// The fields the persistence layer reads from a live backend
pub trait BackendSource {
    fn name(&self) -> &str;

    /// Empty when the orchestrator has not assigned an identity
    fn backend_uuid(&self) -> &str;

    fn is_online(&self) -> bool;

    fn encode_config(&self) -> Result<Vec<u8>>;
}

impl BackendSource for Backend {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend_uuid(&self) -> &str {
        &self.backend_uuid
    }

    fn is_online(&self) -> bool {
        self.online
    }

    fn encode_config(&self) -> Result<Vec<u8>> {
        self.driver.encode_config()
    }
}
