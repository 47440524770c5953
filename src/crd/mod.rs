//! Custom Resource Definitions for the Storage Bridge
//!
//! This module contains the CRD types persisted by the bridge:
//! - StorageBackend: durable envelope around a backend record

pub mod storage_backend;

pub use storage_backend::*;
