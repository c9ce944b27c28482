use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repository::{PeriodRepository, RepositoryError};

/// Backend-agnostic data source configuration.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `location` is passed through to that factory
/// unchanged; its meaning is entirely backend-specific.
///
/// | backend | location examples         |
/// |---------|--------------------------|
/// | `csv`   | `data`, `/srv/periods`   |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"csv"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub location: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: "csv".to_string(),
            location: "data".to_string(),
        }
    }
}

/// One implementation per data source backend. Each backend crate exports a
/// unit struct implementing this trait, registered with a
/// [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open the source and return a ready-to-use repository.
    async fn create(
        &self,
        config: &SourceConfig,
    ) -> Result<Box<dyn PeriodRepository>, RepositoryError>;
}

/// Registry of [`RepositoryFactory`] instances, keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any factory with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory is registered for
    ///   the requested backend.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &SourceConfig,
    ) -> Result<Box<dyn PeriodRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
