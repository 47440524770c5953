//! Capability descriptor constructors
//!
//! Each constructor wraps one protocol enumeration value in the message
//! shape used by the CSI capability handshake.

use super::proto::controller_service_capability::{self, rpc::Type as ControllerRpcType};
use super::proto::node_service_capability::{self, rpc::Type as NodeRpcType};
use super::proto::volume_capability::{access_mode::Mode as AccessModeValue, AccessMode};
use super::proto::{ControllerServiceCapability, NodeServiceCapability};

/// Access-mode descriptor for `mode`
pub fn new_volume_capability_access_mode(mode: AccessModeValue) -> AccessMode {
    AccessMode { mode: mode as i32 }
}

/// Controller-capability descriptor for one controller RPC
pub fn new_controller_service_capability(cap: ControllerRpcType) -> ControllerServiceCapability {
    ControllerServiceCapability {
        r#type: Some(controller_service_capability::Type::Rpc(
            controller_service_capability::Rpc { r#type: cap as i32 },
        )),
    }
}

/// Node-capability descriptor for one node RPC
pub fn new_node_service_capability(cap: NodeRpcType) -> NodeServiceCapability {
    NodeServiceCapability {
        r#type: Some(node_service_capability::Type::Rpc(
            node_service_capability::Rpc { r#type: cap as i32 },
        )),
    }
}
