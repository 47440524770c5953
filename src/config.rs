//! Bridge configuration
//!
//! Loaded from a YAML file; every field has a default so a partial file is
//! enough. CLI flags in the binary override individual fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::frontend::csi::parse_endpoint;
use crate::logging::LogConfig;
use crate::probe::ProbePlatform;

/// Configuration for the bridge process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// CSI endpoint, `unix://<path>` or `tcp://<host:port>`
    pub endpoint: String,

    /// CSI plugin name advertised to the platform
    pub plugin_name: String,

    /// Plugin version advertised to the platform
    pub plugin_version: String,

    /// Name of the node this instance runs on
    pub node_name: String,

    /// Namespace holding StorageBackend resources
    pub namespace: String,

    /// Filesystem probe strategy
    pub probe_platform: ProbePlatform,

    /// Log output
    pub log: LogConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: "unix:///var/lib/storage-bridge/csi.sock".to_string(),
            plugin_name: "csi.storagebridge.io".to_string(),
            plugin_version: crate::VERSION.to_string(),
            node_name: String::new(),
            namespace: "storage-bridge".to_string(),
            probe_platform: ProbePlatform::Auto,
            log: LogConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Check fields that can be checked without touching the system
    pub fn validate(&self) -> Result<()> {
        parse_endpoint(&self.endpoint)?;
        if self.plugin_name.is_empty() {
            return Err(Error::Configuration("plugin name must not be empty".into()));
        }
        if self.namespace.is_empty() {
            return Err(Error::Configuration("namespace must not be empty".into()));
        }
        Ok(())
    }
}
