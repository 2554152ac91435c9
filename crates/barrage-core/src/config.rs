//! Run parameters shared by every backend's load campaign.
//!
//! Resolved once at startup and passed by value into each adapter
//! constructor. There is no global mutable state: whoever builds the
//! process wires a [`RunParams`] through explicitly.

use std::env;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while resolving run parameters.
///
/// All of these are fatal at startup: a malformed setting means the
/// operator asked for something we cannot honor, so we refuse to run
/// rather than silently substitute a default.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but did not parse as a number.
    #[error("invalid value for {var}: {value:?}")]
    InvalidNumber {
        var: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The concurrency limit must allow at least one operation in flight.
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,
}

/// How much load a run issues and how wide each wave may be.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Total number of operations issued per run.
    pub total_ops: u64,
    /// Maximum number of operations concurrently in flight.
    pub concurrency_limit: usize,
}

impl RunParams {
    pub const DEFAULT_TOTAL_OPS: u64 = 5_000_000;
    pub const DEFAULT_CONCURRENCY_LIMIT: usize = 1000;

    pub const TOTAL_OPS_VAR: &str = "BARRAGE_TOTAL_OPS";
    pub const CONCURRENCY_VAR: &str = "BARRAGE_CONCURRENCY_LIMIT";

    /// Build parameters from explicit values, rejecting a zero limit.
    pub fn new(total_ops: u64, concurrency_limit: usize) -> Result<Self, ConfigError> {
        if concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(Self {
            total_ops,
            concurrency_limit,
        })
    }

    /// Build parameters from the environment.
    ///
    /// Priority per field: `BARRAGE_TOTAL_OPS` / `BARRAGE_CONCURRENCY_LIMIT`
    /// env var, then the compile-time default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let total_ops = parse_env(Self::TOTAL_OPS_VAR, Self::DEFAULT_TOTAL_OPS)?;
        let concurrency_limit = parse_env(Self::CONCURRENCY_VAR, Self::DEFAULT_CONCURRENCY_LIMIT)?;
        Self::new(total_ops, concurrency_limit)
    }
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            total_ops: Self::DEFAULT_TOTAL_OPS,
            concurrency_limit: Self::DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

/// Usage text for the shared run-parameter env vars, appended to every
/// backend's help output.
pub const RUN_ENV_HELP: &str = "\
Common barrage env vars:
* BARRAGE_TOTAL_OPS:          default(\"5000000\") ## operations issued per run
* BARRAGE_CONCURRENCY_LIMIT:  default(\"1000\")    ## max operations in flight
";

fn parse_env<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr<Err = ParseIntError>,
{
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidNumber { var, value: raw, source }),
        Err(_) => Ok(default),
    }
}
