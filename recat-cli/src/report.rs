//! Rendering of a batch report.
//!
//! | Format  | Contents                                                      |
//! |---------|---------------------------------------------------------------|
//! | `table` | per-taxpayer bracket breakdown, fee lines, comparison, summary |
//! | `csv`   | one row per taxpayer, subtotals and comparison in columns      |
//!
//! Percentages are rounded half-up to two places in both formats.

use std::fmt::{self, Write as _};
use std::io;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;

use recat_core::BracketLetter;
use recat_core::calculations::common::round_half_up;
use recat_core::calculations::{BatchReport, ComponentLine, RecategorizationResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Table,
    Csv,
}

fn money(value: Decimal) -> String {
    format!("{value:.2}")
}

fn signed(value: Decimal) -> String {
    if value.is_sign_negative() {
        format!("{value:.2}")
    } else {
        format!("+{value:.2}")
    }
}

fn component_status(line: &ComponentLine) -> String {
    match (line.applied, line.reason) {
        (true, _) => money(line.value),
        (false, Some(reason)) => format!("not applied ({reason})"),
        (false, None) => "not configured".to_string(),
    }
}

fn write_result(
    out: &mut String,
    result: &RecategorizationResult,
) -> fmt::Result {
    let category = &result.category;
    let comparison = &result.comparison;

    writeln!(out, "{}  {}", result.taxpayer_id, result.name)?;
    writeln!(
        out,
        "  Category {} (income {}, floor area {}, energy {}, rent {})",
        category.final_category,
        category.by_income,
        category.by_floor_area,
        category.by_energy,
        category.by_rent
    )?;
    let income = category.details.income;
    writeln!(
        out,
        "  Income {} of {} (headroom {})",
        money(income.value),
        money(income.limit),
        money(income.headroom())
    )?;

    for line in &result.fees.components {
        writeln!(
            out,
            "    {:<16} {:<40} {:>16}",
            line.code,
            line.description,
            component_status(line)
        )?;
    }

    write!(out, "  Total {}", money(result.total_fee))?;
    match (comparison.previous_category, comparison.previous_fee) {
        (Some(previous), Some(fee)) => write!(out, "  previous {previous} {}", money(fee))?,
        (Some(previous), None) => write!(out, "  previous {previous}")?,
        (None, _) => {}
    }
    write!(
        out,
        "  [{}] delta {}",
        comparison.change.as_str(),
        signed(comparison.fee_delta)
    )?;
    if let Some(percent) = comparison.percent_delta {
        write!(out, " ({}%)", signed(round_half_up(percent)))?;
    }
    writeln!(out)
}

/// Human-readable report for the terminal.
pub fn render_table(report: &BatchReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_table(&mut out, report)?;
    Ok(out)
}

fn write_table(
    out: &mut String,
    report: &BatchReport,
) -> fmt::Result {
    writeln!(out, "Recategorization for period {}", report.period)?;
    writeln!(out)?;

    for result in &report.results {
        write_result(out, result)?;
        writeln!(out)?;
    }

    let summary = &report.summary;
    writeln!(
        out,
        "{} taxpayers: {} up, {} down, {} same, {} new",
        summary.taxpayers, summary.up, summary.down, summary.same, summary.new
    )?;
    writeln!(
        out,
        "Total fees {} (previous {})",
        money(summary.total_fees),
        money(summary.total_previous_fees)
    )
}

#[derive(Debug, Serialize)]
struct CsvReportRow<'a> {
    period: &'a str,
    taxpayer_id: &'a str,
    name: &'a str,
    by_income: BracketLetter,
    by_floor_area: BracketLetter,
    by_energy: BracketLetter,
    by_rent: BracketLetter,
    category: BracketLetter,
    previous_category: Option<BracketLetter>,
    change: &'static str,
    tax: Decimal,
    pension: Decimal,
    health: Decimal,
    provincial_levy: Decimal,
    municipal_levy: Decimal,
    total_fee: Decimal,
    previous_fee: Option<Decimal>,
    fee_delta: Decimal,
    percent_delta: Option<Decimal>,
}

impl<'a> CsvReportRow<'a> {
    fn new(
        period: &'a str,
        result: &'a RecategorizationResult,
    ) -> Self {
        let subtotals = &result.fees.subtotals;
        Self {
            period,
            taxpayer_id: &result.taxpayer_id,
            name: &result.name,
            by_income: result.category.by_income,
            by_floor_area: result.category.by_floor_area,
            by_energy: result.category.by_energy,
            by_rent: result.category.by_rent,
            category: result.category.final_category,
            previous_category: result.comparison.previous_category,
            change: result.comparison.change.as_str(),
            tax: subtotals.tax,
            pension: subtotals.pension,
            health: subtotals.health,
            provincial_levy: subtotals.provincial,
            municipal_levy: subtotals.municipal,
            total_fee: result.total_fee,
            previous_fee: result.comparison.previous_fee,
            fee_delta: result.comparison.fee_delta,
            percent_delta: result.comparison.percent_delta.map(round_half_up),
        }
    }
}

/// Export one CSV row per taxpayer, header included.
pub fn write_csv<W: io::Write>(
    report: &BatchReport,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for result in &report.results {
        csv_writer.serialize(CsvReportRow::new(&report.period, result))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use recat_core::calculations::Recategorizer;
    use recat_core::{
        Activity, BracketRow, FeeComponentKind, FeeComponentRow, PensionVariant, TaxSubCode,
        TaxpayerInput,
    };

    use super::*;

    fn brackets() -> Vec<BracketRow> {
        [
            (BracketLetter::A, dec!(1000000), dec!(30), dec!(3330), dec!(500000)),
            (BracketLetter::B, dec!(2000000), dec!(45), dec!(5000), dec!(800000)),
        ]
        .into_iter()
        .map(|(category, max_income, max_floor_area, max_energy, max_rent)| BracketRow {
            period: "2025-2".to_string(),
            category,
            max_income,
            max_floor_area,
            max_energy,
            max_rent,
        })
        .collect()
    }

    fn fee_row(
        category: BracketLetter,
        code: &str,
        description: &str,
        value: Decimal,
        kind: FeeComponentKind,
    ) -> FeeComponentRow {
        FeeComponentRow {
            period: "2025-2".to_string(),
            category,
            code: code.to_string(),
            description: description.to_string(),
            value,
            kind,
        }
    }

    fn fee_rows() -> Vec<FeeComponentRow> {
        vec![
            fee_row(
                BracketLetter::B,
                "IMP-GOODS",
                "Integrated tax (goods)",
                dec!(4000),
                FeeComponentKind::Tax {
                    activity: TaxSubCode::Goods,
                },
            ),
            fee_row(
                BracketLetter::B,
                "SIPA",
                "Pension contribution",
                dec!(15500),
                FeeComponentKind::Pension {
                    variant: PensionVariant::Standard,
                },
            ),
        ]
    }

    fn taxpayer() -> TaxpayerInput {
        TaxpayerInput {
            taxpayer_id: "27-1".to_string(),
            name: "Kiosco Sol".to_string(),
            period: "2025-2".to_string(),
            activity: Activity::Goods,
            province_code: "BA".to_string(),
            works_in_rd: false,
            is_retired: false,
            dependents: 0,
            floor_area: None,
            annual_rent: None,
            annual_energy: None,
            annual_sales: dec!(1500000),
            previous_category: Some(BracketLetter::A),
            previous_fee: Some(dec!(15000)),
        }
    }

    fn report() -> BatchReport {
        let brackets = brackets();
        let fee_rows = fee_rows();
        Recategorizer::new(&brackets, &fee_rows).recategorize_all("2025-2", &[taxpayer()])
    }

    #[test]
    fn test_table_lists_lines_and_summary() {
        let table = render_table(&report()).unwrap();

        assert!(table.starts_with("Recategorization for period 2025-2\n"));
        assert!(table.contains("27-1  Kiosco Sol"));
        assert!(table.contains("Category B (income B, floor area A, energy A, rent A)"));
        assert!(table.contains("Income 1500000.00 of 2000000.00 (headroom 500000.00)"));
        assert!(table.contains("4000.00"));
        assert!(table.contains("not configured"), "missing health row:\n{table}");
        assert!(table.contains("Total 19500.00  previous A 15000.00  [UP] delta +4500.00 (+30.00%)"));
        assert!(table.contains("1 taxpayers: 1 up, 0 down, 0 same, 0 new"));
        assert!(table.contains("Total fees 19500.00 (previous 15000.00)"));
    }

    #[test]
    fn test_not_applied_reason_is_shown() {
        let brackets = brackets();
        let fee_rows = fee_rows();
        let mut lessor = taxpayer();
        lessor.activity = Activity::LeaseSmall;
        let report =
            Recategorizer::new(&brackets, &fee_rows).recategorize_all("2025-2", &[lessor]);

        let table = render_table(&report).unwrap();

        assert!(table.contains("not applied (lessor of ≤2 properties)"));
        assert!(table.contains("delta -15000.00 (-100.00%)"));
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_taxpayer() {
        let mut out = Vec::new();

        write_csv(&report(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "period,taxpayer_id,name,by_income,by_floor_area,by_energy,by_rent,category,\
             previous_category,change,tax,pension,health,provincial_levy,municipal_levy,\
             total_fee,previous_fee,fee_delta,percent_delta"
        );
        assert!(lines[1].starts_with("2025-2,27-1,Kiosco Sol,B,A,A,A,B,A,UP,4000,15500,0,"));
    }

    #[test]
    fn test_percentage_is_rounded_half_up() {
        let brackets = brackets();
        let fee_rows = fee_rows();
        let mut taxpayer = taxpayer();
        // 2500 / 17000 = 14.70588...%
        taxpayer.previous_fee = Some(dec!(17000));
        let report =
            Recategorizer::new(&brackets, &fee_rows).recategorize_all("2025-2", &[taxpayer]);
        let mut out = Vec::new();

        let table = render_table(&report).unwrap();
        write_csv(&report, &mut out).unwrap();

        assert!(table.contains("[UP] delta +2500.00 (+14.71%)"), "{table}");
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(",17000,2500,14.71"), "{text}");
    }

    #[test]
    fn test_simplified_regime_levy_is_labelled() {
        let brackets = brackets();
        let mut fee_rows = fee_rows();
        fee_rows.push(fee_row(
            BracketLetter::B,
            "IIBB-CBA",
            "Cordoba gross income levy",
            dec!(6000),
            FeeComponentKind::ProvincialLevy {
                province_code: "CBA".to_string(),
                has_municipal: false,
                simplified_regime: true,
            },
        ));
        let mut taxpayer = taxpayer();
        taxpayer.province_code = "CBA".to_string();
        let report =
            Recategorizer::new(&brackets, &fee_rows).recategorize_all("2025-2", &[taxpayer]);

        let table = render_table(&report).unwrap();

        assert!(table.contains("Cordoba gross income levy (simplified regime)"), "{table}");
        assert!(table.contains("Total 25500.00"));
    }
}
