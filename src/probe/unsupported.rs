//! Probe for platforms without kernel support
//!
//! Tooling built for such platforms still links the probe, but every
//! operation fails the same way. The failure is permanent; retrying is
//! pointless.

use std::path::Path;
use std::sync::Arc;

use super::{FilesystemProbe, FilesystemStats, TraceScope};
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::logging::RequestLogger;

/// [`FilesystemProbe`] whose every operation fails with `UnsupportedPlatform`
pub struct UnsupportedProbe {
    platform: String,
    logger: Arc<dyn RequestLogger>,
}

impl UnsupportedProbe {
    pub fn new(platform: impl Into<String>, logger: Arc<dyn RequestLogger>) -> Self {
        Self {
            platform: platform.into(),
            logger,
        }
    }

    fn unsupported(&self, operation: &str) -> Error {
        Error::UnsupportedPlatform {
            operation: operation.to_string(),
            platform: self.platform.clone(),
        }
    }
}

impl FilesystemProbe for UnsupportedProbe {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn filesystem_size(&self, ctx: &CallContext, _path: &Path) -> Result<u64> {
        let _scope = TraceScope::enter(self.logger.as_ref(), ctx, &self.platform, "filesystem_size");
        Err(self.unsupported("filesystem_size"))
    }

    fn filesystem_stats(&self, ctx: &CallContext, _path: &Path) -> Result<FilesystemStats> {
        let _scope = TraceScope::enter(self.logger.as_ref(), ctx, &self.platform, "filesystem_stats");
        Err(self.unsupported("filesystem_stats"))
    }

    fn block_device_size(&self, ctx: &CallContext, _device: &Path) -> Result<u64> {
        let _scope = TraceScope::enter(self.logger.as_ref(), ctx, &self.platform, "block_device_size");
        Err(self.unsupported("block_device_size"))
    }
}
