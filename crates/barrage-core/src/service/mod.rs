//! The backend capability contract and its registry.
//!
//! Every pluggable backend implements [`Service`] and is registered under
//! a unique name in the [`ServiceRegistry`] during process startup. The
//! process then looks up one service and invokes exactly one of its
//! capabilities:
//!
//! ```text
//! ServiceRegistry --get("redis")--> &dyn Service
//!     |                                  |
//!     |   ping()    -> Result<String, ProbeError>
//!     |   execute() -> Result<RunSummary>
//!     |   help()    -> String
//! ```

pub mod registry;
pub mod trait_def;

pub use registry::{RegistryError, ServiceRegistry};
pub use trait_def::Service;
