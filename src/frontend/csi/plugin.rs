//! CSI plugin front end
//!
//! Holds the parsed endpoint and the fixed capability set this plugin
//! advertises during capability negotiation.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::capabilities::{
    new_controller_service_capability, new_node_service_capability,
    new_volume_capability_access_mode,
};
use super::endpoint::parse_endpoint;
use super::interceptor::{RequestInterceptor, RequestInterceptorLayer};
use super::proto::controller_service_capability::rpc::Type as ControllerRpcType;
use super::proto::node_service_capability::rpc::Type as NodeRpcType;
use super::proto::volume_capability::{access_mode::Mode as AccessModeValue, AccessMode};
use super::proto::{
    ControllerGetCapabilitiesResponse, ControllerServiceCapability, NodeGetCapabilitiesResponse,
    NodeServiceCapability,
};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::logging::RequestLogger;

const CONTROLLER_CAPABILITIES: [ControllerRpcType; 7] = [
    ControllerRpcType::CreateDeleteVolume,
    ControllerRpcType::PublishUnpublishVolume,
    ControllerRpcType::ListVolumes,
    ControllerRpcType::ExpandVolume,
    ControllerRpcType::CloneVolume,
    ControllerRpcType::CreateDeleteSnapshot,
    ControllerRpcType::ListSnapshots,
];

const NODE_CAPABILITIES: [NodeRpcType; 3] = [
    NodeRpcType::StageUnstageVolume,
    NodeRpcType::GetVolumeStats,
    NodeRpcType::ExpandVolume,
];

const ACCESS_MODES: [AccessModeValue; 5] = [
    AccessModeValue::SingleNodeWriter,
    AccessModeValue::SingleNodeReaderOnly,
    AccessModeValue::MultiNodeReaderOnly,
    AccessModeValue::MultiNodeSingleWriter,
    AccessModeValue::MultiNodeMultiWriter,
];

/// The CSI plugin as advertised to the orchestration platform
pub struct CsiFrontend {
    name: String,
    version: String,
    node_name: String,
    scheme: String,
    address: String,
    controller_capabilities: Vec<ControllerServiceCapability>,
    node_capabilities: Vec<NodeServiceCapability>,
    access_modes: Vec<AccessMode>,
    interceptor: RequestInterceptor,
}

impl CsiFrontend {
    /// Build the front end from configuration
    pub fn new(config: &BridgeConfig, logger: Arc<dyn RequestLogger>) -> Result<Self> {
        let (scheme, address) = parse_endpoint(&config.endpoint)?;

        let frontend = Self {
            name: config.plugin_name.clone(),
            version: config.plugin_version.clone(),
            node_name: config.node_name.clone(),
            scheme: scheme.to_string(),
            address: address.to_string(),
            controller_capabilities: CONTROLLER_CAPABILITIES
                .into_iter()
                .map(new_controller_service_capability)
                .collect(),
            node_capabilities: NODE_CAPABILITIES
                .into_iter()
                .map(new_node_service_capability)
                .collect(),
            access_modes: ACCESS_MODES
                .into_iter()
                .map(new_volume_capability_access_mode)
                .collect(),
            interceptor: RequestInterceptor::new(logger),
        };

        info!(
            "CSI front end {} {} on {}://{}",
            frontend.name, frontend.version, frontend.scheme, frontend.address
        );
        Ok(frontend)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Endpoint scheme and address, as written in the configuration
    pub fn endpoint(&self) -> (&str, &str) {
        (&self.scheme, &self.address)
    }

    pub fn controller_get_capabilities(&self) -> ControllerGetCapabilitiesResponse {
        ControllerGetCapabilitiesResponse {
            capabilities: self.controller_capabilities.clone(),
        }
    }

    pub fn node_get_capabilities(&self) -> NodeGetCapabilitiesResponse {
        NodeGetCapabilitiesResponse {
            capabilities: self.node_capabilities.clone(),
        }
    }

    pub fn access_modes(&self) -> &[AccessMode] {
        &self.access_modes
    }

    pub fn supports_access_mode(&self, mode: AccessModeValue) -> bool {
        self.access_modes.iter().any(|m| m.mode == mode as i32)
    }

    pub fn interceptor(&self) -> &RequestInterceptor {
        &self.interceptor
    }

    /// Tower layer wrapping handlers with this front end's interceptor
    pub fn layer(&self) -> RequestInterceptorLayer {
        RequestInterceptorLayer::new(self.interceptor.clone())
    }
}

impl fmt::Debug for CsiFrontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsiFrontend")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("node_name", &self.node_name)
            .field("scheme", &self.scheme)
            .field("address", &self.address)
            .field("controller_capabilities", &self.controller_capabilities.len())
            .field("node_capabilities", &self.node_capabilities.len())
            .field("access_modes", &self.access_modes.len())
            .finish_non_exhaustive()
    }
}
