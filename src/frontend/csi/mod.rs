//! CSI Front End
//!
//! Plumbing between the orchestration platform's CSI calls and the handlers
//! of the outer RPC framework: endpoint parsing, capability descriptors and
//! per-call instrumentation.

pub mod capabilities;
pub mod endpoint;
pub mod interceptor;
pub mod plugin;
pub mod proto;

pub use capabilities::*;
pub use endpoint::*;
pub use interceptor::*;
pub use plugin::*;
