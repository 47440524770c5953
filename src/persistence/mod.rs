//! Backend Persistence
//!
//! Translation between live backends, durable records and stored envelopes,
//! plus the store port that reads and writes envelopes:
//! - [`translator`]: pure, side-effect-free conversions
//! - [`store`]: the [`BackendStore`] port and its in-memory implementation
//! - [`kube_store`]: [`BackendStore`] over the Kubernetes API

pub mod kube_store;
pub mod store;
pub mod translator;

pub use kube_store::KubeBackendStore;
pub use store::{BackendStore, InMemoryBackendStore};
pub use translator::*;
