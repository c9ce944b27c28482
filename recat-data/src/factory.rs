use std::path::Path;

use async_trait::async_trait;

use recat_core::db::{RepositoryFactory, SourceConfig};
use recat_core::{PeriodRepository, RepositoryError};

use crate::repository::CsvPeriodRepository;

/// [`RepositoryFactory`] for directories of CSV tables.
///
/// Register this with a [`recat_core::db::RepositoryRegistry`] to make the
/// `"csv"` backend available:
///
/// ```rust,no_run
/// use recat_core::db::RepositoryRegistry;
/// use recat_data::CsvRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(CsvRepositoryFactory));
/// ```
pub struct CsvRepositoryFactory;

#[async_trait]
impl RepositoryFactory for CsvRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "csv"
    }

    /// Open the data directory named by `config.location`.
    async fn create(
        &self,
        config: &SourceConfig,
    ) -> Result<Box<dyn PeriodRepository>, RepositoryError> {
        let repo = CsvPeriodRepository::open(Path::new(&config.location))
            .map_err(|e| RepositoryError::Source(e.to_string()))?;
        Ok(Box::new(repo))
    }
}
