//! Load-dispatch core for the barrage harness.
//!
//! This crate holds everything a backend adapter needs to be driven
//! uniformly:
//!
//! - [`Service`]: the capability contract every adapter implements
//!   (ping / execute / help), stored as `Box<dyn Service>` in the
//!   [`ServiceRegistry`].
//! - [`WaveDispatcher`]: the scheduling loop. Issues a fixed total number
//!   of operations in successive waves, each wave running at most
//!   `concurrency_limit` tasks in parallel and joining completely before
//!   the next one starts.
//! - [`RunTally`]: the concurrency-safe failure counter workers report
//!   into.
//! - [`RunReport`] / [`RunSummary`]: start/finish timestamps and the
//!   human-readable summary block.
//! - [`probe`]: the bounded TCP health probe shared by adapters.
//!
//! Backend adapters live in `barrage-backends`; this crate contains no
//! knowledge of what a single operation means.

pub mod config;
pub mod dispatch;
pub mod probe;
pub mod report;
pub mod service;
pub mod tally;

pub use config::{ConfigError, RunParams};
pub use dispatch::WaveDispatcher;
pub use probe::{PROBE_TIMEOUT, ProbeError, normalize_host_port, tcp_probe};
pub use report::{RunReport, RunSummary};
pub use service::{RegistryError, Service, ServiceRegistry};
pub use tally::RunTally;
