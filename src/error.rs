//! Error types for the Storage Bridge
//!
//! Provides structured error types for backend record translation, the CSI
//! front end, the filesystem probe and the backend store.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for the bridge
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Protocol Front End Errors
    // =========================================================================
    #[error("invalid endpoint: {endpoint}")]
    InvalidEndpoint { endpoint: String },

    // =========================================================================
    // Backend Record Translation Errors
    // =========================================================================
    #[error("Driver config serialization failed: {0}")]
    Serialization(String),

    #[error("Backend name {name:?} does not produce a legal resource name")]
    InvalidIdentity { name: String },

    #[error("Stored backend decode failed: {0}")]
    Decode(String),

    // =========================================================================
    // Platform Probe Errors
    // =========================================================================
    #[error("{operation} is not supported for {platform}")]
    UnsupportedPlatform { operation: String, platform: String },

    #[error("Device not found: {device}")]
    DeviceNotFound { device: String },

    // =========================================================================
    // Kubernetes / Store Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Resource not found: {kind}/{name}")]
    ResourceNotFound { kind: String, name: String },

    #[error("Resource already exists: {kind}/{name}")]
    ResourceExists { kind: String, name: String },

    // =========================================================================
    // Parse / IO Errors
    // =========================================================================
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Action to take on error when the caller drives a retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Requeue with exponential backoff
    RequeueWithBackoff,
    /// Requeue after specific duration
    RequeueAfter(Duration),
    /// Don't requeue, wait for changes
    NoRequeue,
}

impl Error {
    /// Determine what action to take for this error
    pub fn action(&self) -> ErrorAction {
        match self {
            // Transient errors - retry with backoff
            Error::Kube(_) | Error::Io(_) => ErrorAction::RequeueWithBackoff,

            // Conflicting writer
            Error::ResourceExists { .. } => ErrorAction::RequeueAfter(Duration::from_secs(30)),

            // Deterministic failures - retrying yields the same result
            Error::InvalidEndpoint { .. }
            | Error::Serialization(_)
            | Error::InvalidIdentity { .. }
            | Error::Decode(_)
            | Error::UnsupportedPlatform { .. }
            | Error::DeviceNotFound { .. }
            | Error::Configuration(_)
            | Error::Yaml(_)
            | Error::ResourceNotFound { .. } => ErrorAction::NoRequeue,

            Error::Internal(_) => ErrorAction::RequeueWithBackoff,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        !matches!(self.action(), ErrorAction::NoRequeue)
    }

    /// Check if this error is transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Kube(_) | Error::Io(_))
    }

    /// gRPC status code name used when the error surfaces through the CSI front end
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidEndpoint { .. }
            | Error::InvalidIdentity { .. }
            | Error::Configuration(_)
            | Error::Yaml(_) => "InvalidArgument",
            Error::UnsupportedPlatform { .. } => "Unimplemented",
            Error::ResourceNotFound { .. } | Error::DeviceNotFound { .. } => "NotFound",
            Error::ResourceExists { .. } => "AlreadyExists",
            Error::Kube(_) | Error::Io(_) => "Unavailable",
            Error::Serialization(_) | Error::Decode(_) | Error::Internal(_) => "Internal",
        }
    }
}

/// Result type alias for the bridge
pub type Result<T> = std::result::Result<T, Error>;
