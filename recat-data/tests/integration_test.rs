//! Integration tests running the engine over the CSV fixtures in `test-data/`.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use recat_core::calculations::common::round_half_up;
use recat_core::calculations::{CategoryChange, Recategorizer, check_period_config};
use recat_core::db::{RepositoryRegistry, SourceConfig};
use recat_core::{BracketLetter, PeriodRepository, RepositoryError};
use recat_data::{BracketLoader, CsvPeriodRepository, CsvRepositoryFactory};

const BRACKETS_CSV: &str = include_str!("../test-data/brackets.csv");

fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

fn open_test_repo() -> CsvPeriodRepository {
    CsvPeriodRepository::open(&test_data_dir()).expect("Failed to open test data")
}

#[test]
fn test_parse_bracket_fixture() {
    let rows = BracketLoader::parse(BRACKETS_CSV.as_bytes()).expect("Failed to parse CSV");

    let current: Vec<_> = rows.iter().filter(|r| r.period == "2025-2").collect();
    assert_eq!(current.len(), 11);
    assert_eq!(current[0].category, BracketLetter::A);
    assert_eq!(current[10].category, BracketLetter::K);
    assert_eq!(current[10].max_income, dec!(94805682.90));
}

#[tokio::test]
async fn test_list_fixture_periods() {
    let repo = open_test_repo();

    let periods = repo.list_periods().await.expect("Failed to list periods");

    assert_eq!(periods, vec!["2025-1", "2025-2"]);
}

#[tokio::test]
async fn test_recategorize_fixture_period() {
    let repo = open_test_repo();
    let brackets = repo.get_bracket_rows("2025-2").await.unwrap();
    let fee_rows = repo.get_fee_component_rows("2025-2").await.unwrap();
    let taxpayers = repo.list_taxpayers("2025-2").await.unwrap();

    let report = Recategorizer::new(&brackets, &fee_rows).recategorize_all("2025-2", &taxpayers);

    let outcomes: Vec<_> = report
        .results
        .iter()
        .map(|r| {
            (
                r.taxpayer_id.as_str(),
                r.category.final_category,
                r.total_fee,
                r.comparison.change,
                r.comparison.percent_delta.map(round_half_up),
            )
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (
                "20-12345678-9",
                BracketLetter::H,
                dec!(119000),
                CategoryChange::Up,
                Some(dec!(194.55))
            ),
            (
                "27-23456789-0",
                BracketLetter::A,
                dec!(39000),
                CategoryChange::Down,
                Some(dec!(-2.50))
            ),
            (
                "20-34567890-1",
                BracketLetter::A,
                dec!(0),
                CategoryChange::New,
                None
            ),
            (
                "23-45678901-2",
                BracketLetter::B,
                dec!(71000),
                CategoryChange::Same,
                Some(dec!(18.33))
            ),
        ]
    );

    assert_eq!(report.summary.taxpayers, 4);
    assert_eq!(
        (report.summary.up, report.summary.down, report.summary.same, report.summary.new),
        (1, 1, 1, 1)
    );
    assert_eq!(report.summary.total_fees, dec!(229000));
    assert_eq!(report.summary.total_previous_fees, dec!(140400));
}

#[tokio::test]
async fn test_retired_taxpayer_pays_retiree_minimum_and_dependents() {
    let repo = open_test_repo();
    let brackets = repo.get_bracket_rows("2025-2").await.unwrap();
    let fee_rows = repo.get_fee_component_rows("2025-2").await.unwrap();
    let taxpayers = repo.list_taxpayers("2025-2").await.unwrap();
    let retired = taxpayers
        .iter()
        .find(|t| t.is_retired)
        .expect("fixture has a retired taxpayer");

    let result = Recategorizer::new(&brackets, &fee_rows).recategorize(retired);

    assert_eq!(result.fees.subtotals.pension, dec!(13000));
    // 18000 × (1 + 2 dependents)
    assert_eq!(result.fees.subtotals.health, dec!(54000));
    // CBA has no levy configured at bracket B
    assert_eq!(result.fees.subtotals.provincial, dec!(0));
    assert_eq!(result.fees.components.len(), 3);
}

#[tokio::test]
async fn test_fixture_config_check() {
    let repo = open_test_repo();

    let complete = check_period_config(
        &repo.get_bracket_rows("2025-2").await.unwrap(),
        &repo.get_fee_component_rows("2025-2").await.unwrap(),
    );
    let partial = check_period_config(
        &repo.get_bracket_rows("2025-1").await.unwrap(),
        &repo.get_fee_component_rows("2025-1").await.unwrap(),
    );

    assert!(complete.is_empty(), "unexpected issues: {complete:?}");
    let messages: Vec<_> = partial.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec![
            "bracket A has no goods-tax row",
            "bracket A has no services-tax row",
            "bracket A has no standard pension row",
            "no retiree pension row at bracket A",
        ]
    );
}

#[tokio::test]
async fn test_registry_opens_csv_backend() {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(CsvRepositoryFactory));
    let config = SourceConfig {
        backend: "csv".to_string(),
        location: test_data_dir().display().to_string(),
    };

    let repo = registry.create(&config).await.expect("Failed to open backend");

    assert_eq!(repo.list_taxpayers("2025-2").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_registry_reports_missing_directory() {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(CsvRepositoryFactory));
    let config = SourceConfig {
        backend: "csv".to_string(),
        location: "no/such/dir".to_string(),
    };

    match registry.create(&config).await {
        Err(RepositoryError::Source(msg)) => assert!(msg.contains("brackets.csv"), "got {msg}"),
        Err(other) => panic!("expected Source error, got {other:?}"),
        Ok(_) => panic!("expected Source error, got a repository"),
    }
}
