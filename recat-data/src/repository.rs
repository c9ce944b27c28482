use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use recat_core::{BracketRow, FeeComponentRow, PeriodRepository, RepositoryError, TaxpayerInput};

use crate::loader::{BracketLoader, FeeComponentLoader, LoadError, TaxpayerLoader};

pub const BRACKETS_FILE: &str = "brackets.csv";
pub const FEE_COMPONENTS_FILE: &str = "fee_components.csv";
pub const TAXPAYERS_FILE: &str = "taxpayers.csv";

/// Errors raised while reading a data directory.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Load { path: PathBuf, source: LoadError },
}

/// [`PeriodRepository`] over the three CSV tables of a data directory.
///
/// The files are read once when the repository is opened; every query is
/// answered from memory.
#[derive(Debug, Clone, Default)]
pub struct CsvPeriodRepository {
    brackets: Vec<BracketRow>,
    fee_rows: Vec<FeeComponentRow>,
    taxpayers: Vec<TaxpayerInput>,
}

impl CsvPeriodRepository {
    /// Read `brackets.csv`, `fee_components.csv` and `taxpayers.csv` from `dir`.
    pub fn open(dir: &Path) -> Result<Self, OpenError> {
        let brackets = load_file(&dir.join(BRACKETS_FILE), BracketLoader::parse)?;
        let fee_rows = load_file(&dir.join(FEE_COMPONENTS_FILE), FeeComponentLoader::parse)?;
        let taxpayers = load_file(&dir.join(TAXPAYERS_FILE), TaxpayerLoader::parse)?;

        info!(
            dir = %dir.display(),
            brackets = brackets.len(),
            fee_rows = fee_rows.len(),
            taxpayers = taxpayers.len(),
            "loaded period tables"
        );

        Ok(Self::from_tables(brackets, fee_rows, taxpayers))
    }

    pub fn from_tables(
        brackets: Vec<BracketRow>,
        fee_rows: Vec<FeeComponentRow>,
        taxpayers: Vec<TaxpayerInput>,
    ) -> Self {
        Self {
            brackets,
            fee_rows,
            taxpayers,
        }
    }

    /// Periods with at least one bracket or fee component row.
    fn periods(&self) -> BTreeSet<&str> {
        self.brackets
            .iter()
            .map(|row| row.period.as_str())
            .chain(self.fee_rows.iter().map(|row| row.period.as_str()))
            .collect()
    }

    fn ensure_period(
        &self,
        period: &str,
    ) -> Result<(), RepositoryError> {
        if self.periods().contains(period) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(period.to_string()))
        }
    }
}

fn load_file<T>(
    path: &Path,
    parse: fn(File) -> Result<Vec<T>, LoadError>,
) -> Result<Vec<T>, OpenError> {
    let file = File::open(path).map_err(|source| OpenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(file).map_err(|source| OpenError::Load {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl PeriodRepository for CsvPeriodRepository {
    async fn list_periods(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.periods().into_iter().map(str::to_string).collect())
    }

    async fn get_bracket_rows(
        &self,
        period: &str,
    ) -> Result<Vec<BracketRow>, RepositoryError> {
        self.ensure_period(period)?;
        Ok(self
            .brackets
            .iter()
            .filter(|row| row.period == period)
            .cloned()
            .collect())
    }

    async fn get_fee_component_rows(
        &self,
        period: &str,
    ) -> Result<Vec<FeeComponentRow>, RepositoryError> {
        self.ensure_period(period)?;
        Ok(self
            .fee_rows
            .iter()
            .filter(|row| row.period == period)
            .cloned()
            .collect())
    }

    async fn list_taxpayers(
        &self,
        period: &str,
    ) -> Result<Vec<TaxpayerInput>, RepositoryError> {
        self.ensure_period(period)?;
        Ok(self
            .taxpayers
            .iter()
            .filter(|taxpayer| taxpayer.period == period)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use recat_core::{Activity, BracketLetter, FeeComponentKind};

    use super::*;

    fn bracket(period: &str) -> BracketRow {
        BracketRow {
            period: period.to_string(),
            category: BracketLetter::A,
            max_income: dec!(8992597.87),
            max_floor_area: dec!(30),
            max_energy: dec!(3330),
            max_rent: dec!(2091353.77),
        }
    }

    fn health(period: &str) -> FeeComponentRow {
        FeeComponentRow {
            period: period.to_string(),
            category: BracketLetter::A,
            code: "HEALTH".to_string(),
            description: "Health insurance".to_string(),
            value: dec!(20000),
            kind: FeeComponentKind::Health,
        }
    }

    fn taxpayer(
        id: &str,
        period: &str,
    ) -> TaxpayerInput {
        TaxpayerInput {
            taxpayer_id: id.to_string(),
            name: format!("Taxpayer {id}"),
            period: period.to_string(),
            activity: Activity::Goods,
            province_code: "BA".to_string(),
            works_in_rd: false,
            is_retired: false,
            dependents: 0,
            floor_area: None,
            annual_rent: None,
            annual_energy: None,
            annual_sales: dec!(1000000),
            previous_category: None,
            previous_fee: None,
        }
    }

    fn repo() -> CsvPeriodRepository {
        CsvPeriodRepository::from_tables(
            vec![bracket("2025-1"), bracket("2025-2")],
            vec![health("2025-1"), health("2025-2"), health("2026-1")],
            vec![
                taxpayer("1", "2025-1"),
                taxpayer("2", "2025-2"),
                taxpayer("3", "2025-2"),
            ],
        )
    }

    #[tokio::test]
    async fn test_list_periods_sorted_and_deduplicated() {
        let periods = repo().list_periods().await.unwrap();

        assert_eq!(periods, vec!["2025-1", "2025-2", "2026-1"]);
    }

    #[tokio::test]
    async fn test_queries_filter_by_period() {
        let repo = repo();

        let brackets = repo.get_bracket_rows("2025-2").await.unwrap();
        let fee_rows = repo.get_fee_component_rows("2025-2").await.unwrap();
        let taxpayers = repo.list_taxpayers("2025-2").await.unwrap();

        assert_eq!(brackets, vec![bracket("2025-2")]);
        assert_eq!(fee_rows, vec![health("2025-2")]);
        let ids: Vec<_> = taxpayers.iter().map(|t| t.taxpayer_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_known_period_without_taxpayers_is_empty() {
        let taxpayers = repo().list_taxpayers("2026-1").await.unwrap();

        assert!(taxpayers.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_period_is_not_found() {
        let result = repo().get_bracket_rows("1999-1").await;

        assert!(
            matches!(result, Err(RepositoryError::NotFound(ref p)) if p == "1999-1"),
            "got {result:?}"
        );
    }

    #[test]
    fn test_open_missing_directory_names_file() {
        let err = CsvPeriodRepository::open(Path::new("does-not-exist"))
            .expect_err("directory does not exist");

        assert!(matches!(err, OpenError::Io { .. }));
        assert!(err.to_string().contains(BRACKETS_FILE), "got {err}");
    }
}
