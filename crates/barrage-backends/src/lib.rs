//! Backend adapters for the barrage harness.
//!
//! Each adapter owns its client object and env-sourced configuration,
//! implements the core `Service` contract, and drives its own
//! per-operation function through the shared wave dispatcher. What a
//! "single operation" means (one HTTP request, one store command) is
//! decided entirely here.

pub mod http;
pub mod redis;

pub use self::http::HttpService;
pub use self::redis::RedisService;

use anyhow::Result;
use barrage_core::{RunParams, ServiceRegistry};

/// Construct every known adapter from the environment and register it.
///
/// Called once during startup, before any lookup. A failure here is a
/// configuration error and aborts the process.
pub fn register_all(registry: &mut ServiceRegistry, params: &RunParams) -> Result<()> {
    registry.register(HttpService::from_env(params.clone())?)?;
    registry.register(RedisService::from_env(params.clone())?)?;
    Ok(())
}

/// Read an env var, falling back to `default` when unset.
pub(crate) fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_owned())
}
