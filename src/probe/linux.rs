//! Linux filesystem probe
//!
//! Filesystem figures come from `statvfs(3)`; block device sizes are read
//! from sysfs, which reports them in 512-byte sectors regardless of the
//! device's logical block size.

use nix::sys::statvfs::statvfs;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{FilesystemProbe, FilesystemStats, TraceScope};
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::logging::RequestLogger;

const PLATFORM: &str = "linux";
const SECTOR_SIZE: u64 = 512;

/// [`FilesystemProbe`] backed by statvfs and sysfs
pub struct LinuxProbe {
    logger: Arc<dyn RequestLogger>,
    /// Path to sysfs (for testing)
    sysfs_path: PathBuf,
}

impl LinuxProbe {
    pub fn new(logger: Arc<dyn RequestLogger>) -> Self {
        Self::with_sysfs_path(logger, "/sys")
    }

    pub fn with_sysfs_path(logger: Arc<dyn RequestLogger>, sysfs_path: impl Into<PathBuf>) -> Self {
        Self {
            logger,
            sysfs_path: sysfs_path.into(),
        }
    }

    fn stat(&self, path: &Path) -> Result<FilesystemStats> {
        let buf = statvfs(path).map_err(|errno| {
            Error::Io(std::io::Error::new(
                std::io::Error::from(errno).kind(),
                format!("statvfs {} failed: {}", path.display(), errno),
            ))
        })?;

        let fragment = u64::from(buf.fragment_size());
        let blocks = u64::from(buf.blocks());
        let blocks_free = u64::from(buf.blocks_free());
        let inodes = u64::from(buf.files());
        let inodes_free = u64::from(buf.files_free());

        Ok(FilesystemStats {
            available: u64::from(buf.blocks_available()) * fragment,
            capacity: blocks * fragment,
            usage: blocks.saturating_sub(blocks_free) * fragment,
            inodes,
            inodes_free,
            inodes_used: inodes.saturating_sub(inodes_free),
        })
    }
}

impl FilesystemProbe for LinuxProbe {
    fn platform(&self) -> &str {
        PLATFORM
    }

    fn filesystem_size(&self, ctx: &CallContext, path: &Path) -> Result<u64> {
        let _scope = TraceScope::enter(self.logger.as_ref(), ctx, PLATFORM, "filesystem_size");
        Ok(self.stat(path)?.capacity)
    }

    fn filesystem_stats(&self, ctx: &CallContext, path: &Path) -> Result<FilesystemStats> {
        let _scope = TraceScope::enter(self.logger.as_ref(), ctx, PLATFORM, "filesystem_stats");
        let stats = self.stat(path)?;
        self.logger.debug(
            ctx,
            format_args!(
                "Filesystem {}: capacity {} available {} inodes {}",
                path.display(),
                stats.capacity,
                stats.available,
                stats.inodes
            ),
        );
        Ok(stats)
    }

    fn block_device_size(&self, ctx: &CallContext, device: &Path) -> Result<u64> {
        let _scope = TraceScope::enter(self.logger.as_ref(), ctx, PLATFORM, "block_device_size");

        // resolve /dev/disk/by-* links to the kernel device name
        let resolved = fs::canonicalize(device).map_err(|_| Error::DeviceNotFound {
            device: device.display().to_string(),
        })?;
        let name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::DeviceNotFound {
                device: device.display().to_string(),
            })?;

        let size_path = self.sysfs_path.join("class/block").join(&name).join("size");
        let raw = fs::read_to_string(&size_path).map_err(|_| Error::DeviceNotFound {
            device: device.display().to_string(),
        })?;
        let sectors: u64 = raw.trim().parse().map_err(|e| {
            Error::Internal(format!("Invalid size in {}: {}", size_path.display(), e))
        })?;

        sectors.checked_mul(SECTOR_SIZE).ok_or_else(|| {
            Error::Internal(format!("Size in {} overflows: {} sectors", size_path.display(), sectors))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::RecordingLogger;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn probe(sysfs: &Path) -> (Arc<RecordingLogger>, LinuxProbe) {
        let logger = Arc::new(RecordingLogger::default());
        (logger.clone(), LinuxProbe::with_sysfs_path(logger, sysfs))
    }

    /// Lay out `<root>/dev/<name>` and `<root>/sys/class/block/<name>/size`
    fn fake_device(root: &Path, name: &str, size: &str) -> PathBuf {
        let dev_dir = root.join("dev");
        fs::create_dir_all(&dev_dir).unwrap();
        let device = dev_dir.join(name);
        fs::write(&device, b"").unwrap();

        let block_dir = root.join("sys/class/block").join(name);
        fs::create_dir_all(&block_dir).unwrap();
        fs::write(block_dir.join("size"), size).unwrap();
        device
    }

    #[test]
    fn test_filesystem_stats() {
        let dir = TempDir::new().unwrap();
        let (logger, probe) = probe(Path::new("/sys"));
        let ctx = CallContext::background();

        let stats = probe.filesystem_stats(&ctx, dir.path()).unwrap();
        assert!(stats.capacity > 0);
        assert!(stats.available <= stats.capacity);
        assert!(stats.usage <= stats.capacity);
        assert_eq!(stats.inodes_used, stats.inodes - stats.inodes_free);

        let size = probe.filesystem_size(&ctx, dir.path()).unwrap();
        assert_eq!(size, stats.capacity);

        let messages: Vec<_> = logger.lines().into_iter().map(|l| l.message).collect();
        assert_eq!(messages.first().map(String::as_str), Some(">>>> linux.filesystem_stats"));
        assert_eq!(messages.last().map(String::as_str), Some("<<<< linux.filesystem_size"));
    }

    #[test]
    fn test_filesystem_stats_missing_path() {
        let (logger, probe) = probe(Path::new("/sys"));
        let result = probe.filesystem_stats(
            &CallContext::background(),
            Path::new("/nonexistent/storage-bridge/volume"),
        );
        assert_matches!(result, Err(Error::Io(_)));
        // exit line is written on the error path too
        assert_eq!(logger.lines().len(), 2);
    }

    #[test]
    fn test_block_device_size() {
        let root = TempDir::new().unwrap();
        let device = fake_device(root.path(), "sdz", "2048\n");
        let (_, probe) = probe(&root.path().join("sys"));

        let size = probe
            .block_device_size(&CallContext::background(), &device)
            .unwrap();
        assert_eq!(size, 2048 * 512);
    }

    #[test]
    fn test_block_device_size_through_symlink() {
        let root = TempDir::new().unwrap();
        let device = fake_device(root.path(), "nvme0n1", "4096");
        let link = root.path().join("dev/by-id-disk");
        std::os::unix::fs::symlink(&device, &link).unwrap();
        let (_, probe) = probe(&root.path().join("sys"));

        let size = probe
            .block_device_size(&CallContext::background(), &link)
            .unwrap();
        assert_eq!(size, 4096 * 512);
    }

    #[test]
    fn test_block_device_missing() {
        let root = TempDir::new().unwrap();
        let (_, probe) = probe(&root.path().join("sys"));

        let result = probe.block_device_size(&CallContext::background(), Path::new("/dev/does-not-exist"));
        assert_matches!(result, Err(Error::DeviceNotFound { ref device }) if device == "/dev/does-not-exist");
    }

    #[test]
    fn test_block_device_size_overflow() {
        let root = TempDir::new().unwrap();
        let device = fake_device(root.path(), "sdx", &u64::MAX.to_string());
        let (_, probe) = probe(&root.path().join("sys"));

        let result = probe.block_device_size(&CallContext::background(), &device);
        assert_matches!(result, Err(Error::Internal(msg)) if msg.contains("overflows"));
    }

    #[test]
    fn test_block_device_garbage_size() {
        let root = TempDir::new().unwrap();
        let device = fake_device(root.path(), "sdy", "lots");
        let (_, probe) = probe(&root.path().join("sys"));

        let result = probe.block_device_size(&CallContext::background(), &device);
        assert_matches!(result, Err(Error::Internal(_)));
    }
}
