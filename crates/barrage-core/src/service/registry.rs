//! Service registry -- a named collection of available backend adapters.
//!
//! The registry lets the process look up a backend by name after argument
//! parsing (e.g. `--service redis`). All registrations happen during
//! startup, before any lookup; that ordering is a documented precondition,
//! not something the registry enforces, which is why lookups take no lock.

use std::collections::HashMap;

use thiserror::Error;

use super::trait_def::Service;

/// Errors raised while populating the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two adapters claimed the same name. Shadowing one backend with
    /// another would silently change what a run drives, so this is fatal
    /// at startup.
    #[error("service {0:?} is already registered")]
    Duplicate(String),
}

/// A collection of registered [`Service`] implementations, keyed by name.
///
/// # Example
///
/// ```ignore
/// let mut registry = ServiceRegistry::new();
/// registry.register(HttpService::from_env(params)?)?;
/// let service = registry.get("http").unwrap();
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Box<dyn Service>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend adapter.
    ///
    /// The service is stored under the name returned by [`Service::name`].
    /// A duplicate name is rejected rather than shadowed.
    pub fn register(&mut self, service: impl Service + 'static) -> Result<(), RegistryError> {
        let name = service.name().to_string();
        if self.services.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.services.insert(name, Box::new(service));
        Ok(())
    }

    /// Look up a service by name.
    pub fn get(&self, name: &str) -> Option<&dyn Service> {
        self.services.get(name).map(|b| b.as_ref())
    }

    /// List the names of all registered services.
    ///
    /// The order is not guaranteed (HashMap iteration order).
    pub fn list(&self) -> Vec<&str> {
        self.services.keys().map(|s| s.as_str()).collect()
    }

    /// Return the number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Return `true` if no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::probe::ProbeError;
    use crate::report::{RunReport, RunSummary};

    /// Minimal test backend.
    struct FakeService {
        service_name: String,
    }

    impl FakeService {
        fn new(name: &str) -> Self {
            Self {
                service_name: name.to_string(),
            }
        }
    }

    #[async_trait]
    impl Service for FakeService {
        fn name(&self) -> &str {
            &self.service_name
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
            String::new()
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry = ServiceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn register_and_get() {
        let mut registry = ServiceRegistry::new();
        registry.register(FakeService::new("alpha")).unwrap();

        let service = registry.get("alpha");
        assert!(service.is_some());
        assert_eq!(service.unwrap().name(), "alpha");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ServiceRegistry::new();
        registry.register(FakeService::new("alpha")).unwrap();

        let err = registry.register(FakeService::new("alpha")).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "alpha"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_missing_returns_none() {
        let registry = ServiceRegistry::new();
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn list_returns_all_names() {
        let mut registry = ServiceRegistry::new();
        registry.register(FakeService::new("alpha")).unwrap();
        registry.register(FakeService::new("beta")).unwrap();
        registry.register(FakeService::new("gamma")).unwrap();

        let mut names = registry.list();
        names.sort();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn registry_debug_shows_names() {
        let mut registry = ServiceRegistry::new();
        registry.register(FakeService::new("test-service")).unwrap();
        let debug = format!("{registry:?}");
        assert!(debug.contains("test-service"));
    }
}
