//! Storage Bridge
//!
//! Composes the CSI front end, the filesystem probe and the backend store
//! from configuration, reloads persisted backends and reports what the
//! process would advertise to the orchestration platform.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use storage_bridge::frontend::csi::proto::{controller_service_capability, node_service_capability};
use storage_bridge::{
    init_logging, BackendStore, BridgeConfig, CallContext, ContextSource, CsiFrontend,
    InMemoryBackendStore, KubeBackendStore, ProbeFactory, ProbePlatform, RequestLogger, Result,
    TracingLogger,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Storage Bridge - CSI front end and backend persistence for network storage
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// CSI endpoint (unix://<path> or tcp://<host:port>)
    #[arg(long, env = "CSI_ENDPOINT")]
    endpoint: Option<String>,

    /// Name of the node this instance runs on
    #[arg(long, env = "NODE_NAME")]
    node_name: Option<String>,

    /// Namespace holding StorageBackend resources
    #[arg(long, env = "BRIDGE_NAMESPACE")]
    namespace: Option<String>,

    /// Filesystem probe strategy
    #[arg(long, env = "PROBE_PLATFORM", value_enum)]
    probe_platform: Option<ProbePlatform>,

    /// Report filesystem statistics for this path
    #[arg(long)]
    stats_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Run in standalone mode (no Kubernetes)
    #[arg(long, env = "STANDALONE")]
    standalone: bool,
}

impl Args {
    /// Load the configuration file, then apply flag overrides
    fn into_config(self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(node_name) = self.node_name {
            config.node_name = node_name;
        }
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(platform) = self.probe_platform {
            config.probe_platform = platform;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        config.log.json |= self.log_json;

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let standalone = args.standalone;
    let stats_path = args.stats_path.clone();
    let config = args.into_config()?;

    init_logging(&config.log)?;

    info!("Starting Storage Bridge");
    info!("  Version: {}", storage_bridge::VERSION);
    info!("  Endpoint: {}", config.endpoint);
    info!("  Namespace: {}", config.namespace);
    info!("  Standalone mode: {}", standalone);

    let logger: Arc<dyn RequestLogger> = Arc::new(TracingLogger);

    let frontend = CsiFrontend::new(&config, logger.clone())?;
    report_capabilities(&frontend);

    let platform = config.probe_platform.resolve();
    let probe = ProbeFactory::create(platform, logger.clone());
    info!("Filesystem probe: {} ({})", platform, probe.platform());

    let store: Arc<dyn BackendStore> = if standalone {
        Arc::new(InMemoryBackendStore::new())
    } else {
        let client = kube::Client::try_default().await?;
        Arc::new(KubeBackendStore::new(client, &config.namespace))
    };

    let backends = store.list_backends().await?;
    info!("Reloaded {} persisted backends", backends.len());
    for backend in &backends {
        info!(
            "  {} (uuid: {}, online: {}, version: {})",
            backend.backend_name, backend.backend_uuid, backend.online, backend.version
        );
    }

    if let Some(path) = stats_path {
        let ctx = CallContext::background().derive_for_request(logger.new_request_id(), ContextSource::Internal);
        match probe.filesystem_stats(&ctx, &path) {
            Ok(stats) => info!(
                "{}: capacity {} available {} used {} inodes {}/{}",
                path.display(),
                stats.capacity,
                stats.available,
                stats.usage,
                stats.inodes_used,
                stats.inodes
            ),
            Err(e) => error!("Filesystem stats for {} failed: {}", path.display(), e),
        }
    }

    info!("Storage Bridge startup report complete");
    Ok(())
}

// =============================================================================
// Capability Report
// =============================================================================

fn report_capabilities(frontend: &CsiFrontend) {
    let (scheme, address) = frontend.endpoint();
    info!("CSI plugin {} {} ({}://{})", frontend.name(), frontend.version(), scheme, address);

    for capability in frontend.controller_get_capabilities().capabilities {
        if let Some(controller_service_capability::Type::Rpc(rpc)) = capability.r#type {
            info!("  controller capability: {:?}", rpc.r#type());
        }
    }

    for capability in frontend.node_get_capabilities().capabilities {
        if let Some(node_service_capability::Type::Rpc(rpc)) = capability.r#type {
            info!("  node capability: {:?}", rpc.r#type());
        }
    }

    for mode in frontend.access_modes() {
        info!("  access mode: {:?}", mode.mode());
    }
}
