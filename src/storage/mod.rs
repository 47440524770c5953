//! Storage Backend Model
//!
//! Live backend objects as the orchestrator holds them, and the durable
//! record derived from them:
//! - [`Backend`]: name, driver and operational state
//! - [`StorageDriver`]: the driver's config encode contract
//! - [`PersistentBackendRecord`]: the snapshot written to the store

pub mod backend;
pub mod record;

pub use backend::*;
pub use record::*;
