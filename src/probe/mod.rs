//! Filesystem and Block Device Probes
//!
//! Node-side volume operations ask a [`FilesystemProbe`] for capacity and
//! usage. The strategy is chosen once when the process is composed:
//! - [`LinuxProbe`]: statvfs and sysfs backed
//! - [`UnsupportedProbe`]: fixed failure for platforms without kernel support

#[cfg(unix)]
mod linux;
mod unsupported;

#[cfg(unix)]
pub use linux::*;
pub use unsupported::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::context::CallContext;
use crate::error::Result;
use crate::logging::RequestLogger;

// =============================================================================
// Probe Types
// =============================================================================

/// Filesystem statistics for a mounted path, in bytes and inode counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemStats {
    pub available: u64,
    pub capacity: u64,
    pub usage: u64,
    pub inodes: u64,
    pub inodes_free: u64,
    pub inodes_used: u64,
}

/// Filesystem and device introspection.
///
/// Calls are synchronous and may block on the kernel; any timeout is the
/// caller's business. When an error is returned no measurement exists.
pub trait FilesystemProbe: Send + Sync {
    /// Platform label used in logs and errors
    fn platform(&self) -> &str;

    /// Total size of the filesystem mounted at `path`
    fn filesystem_size(&self, ctx: &CallContext, path: &Path) -> Result<u64>;

    /// Detailed statistics of the filesystem mounted at `path`
    fn filesystem_stats(&self, ctx: &CallContext, path: &Path) -> Result<FilesystemStats>;

    /// Size of the raw block device at `device`
    fn block_device_size(&self, ctx: &CallContext, device: &Path) -> Result<u64>;
}

// =============================================================================
// Trace Scope
// =============================================================================

/// Writes the `>>>>` entry line on creation and the `<<<<` exit line on drop
pub(crate) struct TraceScope<'a> {
    logger: &'a dyn RequestLogger,
    ctx: &'a CallContext,
    platform: &'a str,
    operation: &'static str,
}

impl<'a> TraceScope<'a> {
    pub(crate) fn enter(
        logger: &'a dyn RequestLogger,
        ctx: &'a CallContext,
        platform: &'a str,
        operation: &'static str,
    ) -> Self {
        logger.debug(ctx, format_args!(">>>> {}.{}", platform, operation));
        Self {
            logger,
            ctx,
            platform,
            operation,
        }
    }
}

impl Drop for TraceScope<'_> {
    fn drop(&mut self) {
        self.logger.debug(
            self.ctx,
            format_args!("<<<< {}.{}", self.platform, self.operation),
        );
    }
}

// =============================================================================
// Strategy Selection
// =============================================================================

/// Which probe implementation to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbePlatform {
    /// Pick from the platform the process runs on
    #[default]
    Auto,
    Linux,
    Unsupported,
}

impl ProbePlatform {
    /// Platform of the running process
    pub fn detect() -> Self {
        if std::env::consts::OS == "linux" {
            ProbePlatform::Linux
        } else {
            ProbePlatform::Unsupported
        }
    }

    /// Replace `Auto` with the detected platform
    pub fn resolve(self) -> Self {
        match self {
            ProbePlatform::Auto => Self::detect(),
            other => other,
        }
    }
}

impl std::fmt::Display for ProbePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbePlatform::Auto => write!(f, "auto"),
            ProbePlatform::Linux => write!(f, "linux"),
            ProbePlatform::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Factory for creating filesystem probes
pub struct ProbeFactory;

impl ProbeFactory {
    /// Create the probe for `platform`
    pub fn create(platform: ProbePlatform, logger: Arc<dyn RequestLogger>) -> Arc<dyn FilesystemProbe> {
        match platform.resolve() {
            #[cfg(unix)]
            ProbePlatform::Linux => Arc::new(LinuxProbe::new(logger)),
            _ => Arc::new(UnsupportedProbe::new(std::env::consts::OS, logger)),
        }
    }
}
