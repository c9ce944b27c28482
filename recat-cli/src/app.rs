use tracing::{debug, warn};

use recat_core::calculations::{BatchReport, ConfigIssue, Recategorizer, check_period_config};
use recat_core::db::RepositoryRegistry;
use recat_core::{PeriodRepository, RepositoryError};
use recat_data::CsvRepositoryFactory;

/// Registry with every backend this binary ships with.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(CsvRepositoryFactory));
    registry
}

/// Recategorize every taxpayer of `period`.
///
/// The bracket and fee tables are fetched once for the whole batch.
/// Configuration problems are logged but do not stop the run.
pub async fn run_period(
    repo: &dyn PeriodRepository,
    period: &str,
) -> Result<BatchReport, RepositoryError> {
    let brackets = repo.get_bracket_rows(period).await?;
    let fee_rows = repo.get_fee_component_rows(period).await?;
    let taxpayers = repo.list_taxpayers(period).await?;
    debug!(
        period,
        brackets = brackets.len(),
        fee_rows = fee_rows.len(),
        taxpayers = taxpayers.len(),
        "fetched period tables"
    );

    for issue in check_period_config(&brackets, &fee_rows) {
        warn!(period, %issue, "period configuration issue");
    }

    Ok(Recategorizer::new(&brackets, &fee_rows).recategorize_all(period, &taxpayers))
}

/// Every configuration issue of `period`; empty when the tables are complete.
pub async fn validate_period(
    repo: &dyn PeriodRepository,
    period: &str,
) -> Result<Vec<ConfigIssue>, RepositoryError> {
    let brackets = repo.get_bracket_rows(period).await?;
    let fee_rows = repo.get_fee_component_rows(period).await?;
    Ok(check_period_config(&brackets, &fee_rows))
}
