//! Storage Bridge - CSI Front End and Backend Persistence
//!
//! A storage orchestration agent that sits between a Kubernetes cluster and
//! heterogeneous network storage backends. It speaks CSI to the platform's
//! node and controller plugins and persists backend configuration so the
//! orchestrator can rebuild its view of provisioned backends after a restart.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        Orchestration Platform (CSI)                          │
//! └──────────────────────────────────┬──────────────────────────────────────────┘
//!                                    │ gRPC
//! ┌──────────────────────────────────┴──────────────────────────────────────────┐
//! │  ┌─────────────────────────────┐        ┌─────────────────────────────────┐  │
//! │  │     CSI Front End           │        │     Filesystem Probe            │  │
//! │  │  endpoint / capabilities /  │        │  linux (statvfs, sysfs)         │  │
//! │  │  request interceptor        │        │  unsupported (fixed failure)    │  │
//! │  └─────────────────────────────┘        └─────────────────────────────────┘  │
//! ├──────────────────────────────────────────────────────────────────────────────┤
//! │  Backend ──▶ PersistentBackendRecord ──▶ StorageBackend (CRD envelope)       │
//! │                     ▲                              │                         │
//! │                     └──────────────────────────────┘                         │
//! ├──────────────────────────────────────────────────────────────────────────────┤
//! │                 Backend Store (in-memory / Kubernetes API)                   │
//! └──────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`frontend`]: CSI endpoint parsing, capability descriptors, interceptor
//! - [`persistence`]: record translation and the backend store
//! - [`storage`]: live backends and durable records
//! - [`crd`]: the `StorageBackend` custom resource
//! - [`probe`]: filesystem and block device introspection
//! - [`context`] / [`logging`]: request correlation and log output
//! - [`config`]: process configuration
//! - [`error`]: Error types and handling

pub mod config;
pub mod context;
pub mod crd;
pub mod error;
pub mod frontend;
pub mod logging;
pub mod persistence;
pub mod probe;
pub mod storage;

// Re-export commonly used types
pub use config::BridgeConfig;

pub use context::{CallContext, ContextSource};

pub use crd::{
    sanitize_name, StorageBackend, StorageBackendSpec, BACKEND_API_VERSION, BACKEND_KIND,
};

pub use error::{Error, ErrorAction, Result};

pub use frontend::csi::{
    new_controller_service_capability, new_node_service_capability,
    new_volume_capability_access_mode, parse_endpoint, CsiFrontend, RequestInterceptor,
    RequestInterceptorLayer, RpcCall,
};

pub use logging::{init_logging, LogConfig, RequestLogger, TracingLogger};

pub use persistence::{
    construct_record, decode_envelope, encode_envelope, from_envelope, to_envelope,
    BackendStore, InMemoryBackendStore, KubeBackendStore,
};

pub use probe::{FilesystemProbe, FilesystemStats, ProbeFactory, ProbePlatform, UnsupportedProbe};

pub use storage::{
    encode_driver_config, Backend, BackendSource, BackendState, PersistentBackendRecord,
    StorageDriver, DEFAULT_SCHEMA_VERSION,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
