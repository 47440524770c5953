//! Logging and request correlation
//!
//! The front end and the probes never reach for a process-wide logger.
//! They receive an [`RequestLogger`] at construction time, which mints
//! correlation identifiers and writes context-tagged log lines.

use crate::context::CallContext;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter};
use uuid::Uuid;

// =============================================================================
// Request Logger
// =============================================================================

/// Logging and correlation collaborator injected into the front end and probes
pub trait RequestLogger: Send + Sync {
    /// Generate a fresh correlation identifier
    fn new_request_id(&self) -> String;

    /// Write a diagnostic line tagged with the call context
    fn debug(&self, ctx: &CallContext, message: fmt::Arguments<'_>);

    /// Write an error line tagged with the call context
    fn error(&self, ctx: &CallContext, message: fmt::Arguments<'_>);
}

/// [`RequestLogger`] backed by `tracing` events and UUID v4 request ids
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn new_request_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn debug(&self, ctx: &CallContext, message: fmt::Arguments<'_>) {
        tracing::debug!(
            request_id = ctx.request_id().unwrap_or_default(),
            request_source = %source_label(ctx),
            "{}",
            message
        );
    }

    fn error(&self, ctx: &CallContext, message: fmt::Arguments<'_>) {
        tracing::error!(
            request_id = ctx.request_id().unwrap_or_default(),
            request_source = %source_label(ctx),
            "{}",
            message
        );
    }
}

fn source_label(ctx: &CallContext) -> String {
    ctx.source().map(|s| s.to_string()).unwrap_or_default()
}

// =============================================================================
// Subscriber Setup
// =============================================================================

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output logs as JSON
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO on unknown names
    pub fn level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install the global `tracing` subscriber
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter = EnvFilter::from_default_env().add_directive(config.level().into());
    for directive in ["hyper=warn", "kube=info", "tower=warn"] {
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| Error::Configuration(format!("Invalid log directive: {}", e)))?,
        );
    }

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(subscriber_fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(subscriber_fmt::layer().with_target(true))
            .try_init()
    };

    result.map_err(|e| Error::Internal(format!("Failed to install log subscriber: {}", e)))
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// One captured log line
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct LogLine {
        pub level: Level,
        pub request_id: Option<String>,
        pub message: String,
    }

    /// Logger that records every line for assertions
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        next_id: AtomicU64,
        lines: Mutex<Vec<LogLine>>,
    }

    impl RecordingLogger {
        pub fn lines(&self) -> Vec<LogLine> {
            self.lines.lock().clone()
        }

        pub fn messages(&self, level: Level) -> Vec<String> {
            self.lines
                .lock()
                .iter()
                .filter(|l| l.level == level)
                .map(|l| l.message.clone())
                .collect()
        }

        fn record(&self, level: Level, ctx: &CallContext, message: fmt::Arguments<'_>) {
            self.lines.lock().push(LogLine {
                level,
                request_id: ctx.request_id().map(str::to_string),
                message: message.to_string(),
            });
        }
    }

    impl RequestLogger for RecordingLogger {
        fn new_request_id(&self) -> String {
            format!("req-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        }

        fn debug(&self, ctx: &CallContext, message: fmt::Arguments<'_>) {
            self.record(Level::DEBUG, ctx, message);
        }

        fn error(&self, ctx: &CallContext, message: fmt::Arguments<'_>) {
            self.record(Level::ERROR, ctx, message);
        }
    }
}
