//! Per-call correlation context
//!
//! A [`CallContext`] travels with every inbound request and every probe call.
//! It carries the correlation identifier and origin tag used in log lines,
//! plus the deadline and cancellation token owned by the transport runtime.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Context Source
// =============================================================================

/// Origin of a call, attached to every log line emitted on its behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextSource {
    /// Inbound CSI gRPC call from the orchestration platform
    Csi,
    /// Work started by the bridge itself
    Internal,
}

impl std::fmt::Display for ContextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextSource::Csi => write!(f, "CSI"),
            ContextSource::Internal => write!(f, "Internal"),
        }
    }
}

// =============================================================================
// Call Context
// =============================================================================

/// Correlation and cancellation state for a single call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    request_id: Option<String>,
    source: Option<ContextSource>,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Root context with no correlation data, deadline or parent cancellation
    pub fn background() -> Self {
        Self::default()
    }

    /// Attach a deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation token owned by the caller
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Derive a child context for a single request.
    ///
    /// The deadline and cancellation token are carried over unchanged; only
    /// the correlation identifier and source are replaced.
    pub fn derive_for_request(&self, request_id: impl Into<String>, source: ContextSource) -> Self {
        Self {
            request_id: Some(request_id.into()),
            source: Some(source),
            deadline: self.deadline,
            cancellation: self.cancellation.clone(),
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn source(&self) -> Option<ContextSource> {
        self.source
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
