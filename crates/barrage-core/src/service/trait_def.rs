//! The `Service` trait -- the adapter interface for load-test backends.
//!
//! Each concrete backend (HTTP endpoint, Redis store, etc.) implements
//! this trait. The trait is intentionally object-safe so it can be stored
//! as `Box<dyn Service>` in the [`super::ServiceRegistry`].

use anyhow::Result;
use async_trait::async_trait;

use crate::probe::ProbeError;
use crate::report::RunSummary;

/// Adapter interface for driving load against one kind of backend.
///
/// Implementors own their client object and configuration; the core never
/// learns what a single operation means. One instance exists per backend
/// kind for the process lifetime, owned by the registry.
///
/// # Object Safety
///
/// This trait is object-safe: every method returns a concrete type. This
/// means you can store `Box<dyn Service>` in collections such as
/// [`super::ServiceRegistry`].
#[async_trait]
pub trait Service: Send + Sync {
    /// Registry key for this backend (e.g. "http", "redis").
    fn name(&self) -> &str;

    /// Single bounded health probe against the backend's address.
    ///
    /// Returns the acknowledgment text (conventionally `PONG`) or a typed
    /// failure. Independent of the load dispatcher; never issues more
    /// than one connection.
    async fn ping(&self) -> Result<String, ProbeError>;

    /// Run a full bounded-concurrency load campaign against this backend.
    ///
    /// Issues the configured total number of operations in waves, folds
    /// failures into a per-run tally, and returns the populated summary.
    /// Per-run state is created inside the call, so repeated invocations
    /// start from zero.
    async fn execute(&self) -> Result<RunSummary>;

    /// Static usage text describing this backend's env vars.
    fn help(&self) -> String;
}

// Compile-time assertion: Service must be object-safe.
// If this line compiles, the trait can be used as `dyn Service`.
const _: () = {
    fn _assert_object_safe(_: &dyn Service) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RunReport;

    /// A trivial backend that succeeds at everything, used only to prove
    /// the trait can be implemented and used as `dyn Service`.
    struct NoopService;

    #[async_trait]
    impl Service for NoopService {
        fn name(&self) -> &str {
            "noop"
        }

        async fn ping(&self) -> Result<String, ProbeError> {
            Ok("PONG".to_string())
        }

        async fn execute(&self) -> Result<RunSummary> {
            let mut report = RunReport::new();
            report.begin();
            report.end();
            report.summarize(0, 0)
        }

        fn help(&self) -> String {
            "no knobs".to_string()
        }
    }

    #[test]
    fn service_is_object_safe() {
        // If this compiles, the trait is object-safe.
        let service: Box<dyn Service> = Box::new(NoopService);
        assert_eq!(service.name(), "noop");
    }

    #[tokio::test]
    async fn noop_service_capabilities() {
        let service: Box<dyn Service> = Box::new(NoopService);

        assert_eq!(service.ping().await.unwrap(), "PONG");
        assert_eq!(service.help(), "no knobs");

        let summary = service.execute().await.unwrap();
        assert_eq!(summary.total_ops, 0);
        assert_eq!(summary.error_count, 0);
        assert!(summary.finished_at >= summary.started_at);
    }
}
