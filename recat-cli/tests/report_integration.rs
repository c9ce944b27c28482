//! End-to-end runs of the application layer against the CSV fixtures shipped
//! with `recat-data`.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use recat_cli::app;
use recat_cli::report::{render_table, write_csv};
use recat_core::db::SourceConfig;

fn fixture_source() -> SourceConfig {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("recat-data")
        .join("test-data");
    SourceConfig {
        backend: "csv".to_string(),
        location: dir.display().to_string(),
    }
}

#[tokio::test]
async fn test_run_fixture_period_as_table() {
    let repo = app::build_registry()
        .create(&fixture_source())
        .await
        .expect("fixture source should open");

    let report = app::run_period(&*repo, "2025-2").await.unwrap();
    let table = render_table(&report).unwrap();

    assert_eq!(report.summary.total_fees, dec!(229000));
    assert!(table.contains("20-12345678-9  Estudio Perez"));
    assert!(table.contains("Category H (income C, floor area D, energy A, rent H)"));
    assert!(table.contains("Cordoba gross income levy (simplified regime)"));
    assert!(table.contains("Cordoba gross income levy (municipal)"));
    assert!(table.contains("CBA_MUNI"));
    assert!(table.contains("[UP] delta +78600.00 (+194.55%)"));
    assert!(table.contains("Health insurance ×3 (2 dependents)"));
    assert!(table.contains("4 taxpayers: 1 up, 1 down, 1 same, 1 new"));
}

#[tokio::test]
async fn test_run_fixture_period_as_csv() {
    let repo = app::build_registry()
        .create(&fixture_source())
        .await
        .expect("fixture source should open");
    let report = app::run_period(&*repo, "2025-2").await.unwrap();
    let mut out = Vec::new();

    write_csv(&report, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let rows: Vec<_> = text.lines().skip(1).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[2].starts_with("2025-2,20-34567890-1,Ana Gomez,A,A,A,A,A,,NEW,0,0,0,0,0,0,,"));
}

#[tokio::test]
async fn test_validate_fixture_periods() {
    let repo = app::build_registry()
        .create(&fixture_source())
        .await
        .expect("fixture source should open");

    let complete = app::validate_period(&*repo, "2025-2").await.unwrap();
    let partial = app::validate_period(&*repo, "2025-1").await.unwrap();

    assert!(complete.is_empty(), "unexpected issues: {complete:?}");
    assert_eq!(partial.len(), 4);
}
