use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BracketRow, FeeComponentRow, TaxpayerInput};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Period not found: {0}")]
    NotFound(String),

    #[error("Data source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Read-only access to the tables of a period.
///
/// A batch fetches the bracket and fee component tables once and reuses them
/// for every taxpayer of the period.
#[async_trait]
pub trait PeriodRepository: Send + Sync {
    async fn list_periods(&self) -> Result<Vec<String>, RepositoryError>;

    // Period tables
    async fn get_bracket_rows(
        &self,
        period: &str,
    ) -> Result<Vec<BracketRow>, RepositoryError>;

    async fn get_fee_component_rows(
        &self,
        period: &str,
    ) -> Result<Vec<FeeComponentRow>, RepositoryError>;

    // Taxpayers
    async fn list_taxpayers(
        &self,
        period: &str,
    ) -> Result<Vec<TaxpayerInput>, RepositoryError>;
}
