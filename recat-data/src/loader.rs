//! CSV loaders for the three tables of a period.
//!
//! Every loader trims cells, rejects rows with a wrong column count and
//! reports problems with the 1-based data row they occurred on (header is
//! row 0). Headers are matched by name, so column order does not matter.
//!
//! ## `brackets.csv`
//!
//! | Column           | Type    | Notes                  |
//! |------------------|---------|------------------------|
//! | `period`         | string  | e.g. `2025-2`          |
//! | `category`       | letter  | `A` to `K`             |
//! | `max_income`     | decimal | inclusive ceiling      |
//! | `max_floor_area` | decimal | m²                     |
//! | `max_energy`     | decimal | kWh per year           |
//! | `max_rent`       | decimal | annual rent            |
//!
//! ## `fee_components.csv`
//!
//! | Column              | Required for          | Notes                              |
//! |---------------------|-----------------------|------------------------------------|
//! | `period`            | all                   |                                    |
//! | `category`          | all                   |                                    |
//! | `component_type`    | all                   | `TAX`, `PENSION`, `HEALTH`, `PROVINCIAL_LEVY` |
//! | `code`              | all                   |                                    |
//! | `description`       | all                   |                                    |
//! | `value`             | all                   | decimal                            |
//! | `sub_code`          | `TAX`, `PENSION`      | `goods-tax`, `services-tax` / `standard`, `retiree` |
//! | `province_code`     | `PROVINCIAL_LEVY`     | municipal rows: code `<province>_MUNI` |
//! | `has_municipal`     | no                    | flag, empty means false            |
//! | `simplified_regime` | no                    | flag, empty means false            |
//!
//! ## `taxpayers.csv`
//!
//! `period,taxpayer_id,name,activity,province_code,works_in_rd,is_retired,dependents,floor_area,annual_rent,annual_energy,annual_sales,previous_category,previous_fee`
//!
//! `activity` is one of `GOODS`, `SERVICES`, `LEASE`, `LEASE_SMALL`. The
//! optional measures and the previous category and fee may be left empty.
//!
//! Flags accept `true`/`false`, `yes`/`no` and `1`/`0` in any case.

use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use recat_core::{
    Activity, BracketLetter, BracketRow, FeeComponentKind, FeeComponentRow, MAX_DEPENDENTS,
    PensionVariant, TaxSubCode, TaxpayerInput,
};

/// Errors that can occur while loading a period table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Structurally invalid CSV, a missing column or a cell of the wrong type.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid {column} '{value}' on row {row}")]
    InvalidValue {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("{column} is required on row {row}")]
    MissingValue { column: &'static str, row: usize },

    #[error(
        "{dependents} dependents on row {row} exceeds the maximum of {max}",
        max = MAX_DEPENDENTS
    )]
    TooManyDependents { dependents: u8, row: usize },
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input)
}

/// Deserialise every row and convert it, numbering rows from 1.
fn parse_rows<R, Row, T>(
    input: R,
    convert: impl Fn(Row, usize) -> Result<T, LoadError>,
) -> Result<Vec<T>, LoadError>
where
    R: Read,
    Row: serde::de::DeserializeOwned,
{
    reader(input)
        .deserialize::<Row>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert(row, idx + 1)
        })
        .collect()
}

fn parse_category(
    value: String,
    row: usize,
) -> Result<BracketLetter, LoadError> {
    BracketLetter::parse(&value).ok_or(LoadError::InvalidValue {
        column: "category",
        value,
        row,
    })
}

fn parse_flag(
    column: &'static str,
    value: Option<String>,
    row: usize,
) -> Result<bool, LoadError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Ok(false),
        "true" | "yes" | "1" => Ok(true),
        _ => Err(LoadError::InvalidValue { column, value, row }),
    }
}

fn required(
    column: &'static str,
    value: Option<String>,
    row: usize,
) -> Result<String, LoadError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(LoadError::MissingValue { column, row })
}

// ---------------------------------------------------------------------------
// Brackets
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BracketRecord {
    period: String,
    category: String,
    max_income: Decimal,
    max_floor_area: Decimal,
    max_energy: Decimal,
    max_rent: Decimal,
}

pub struct BracketLoader;

impl BracketLoader {
    /// Parse `brackets.csv` rows. Rows are returned in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRow>, LoadError> {
        parse_rows(reader, |record: BracketRecord, row| {
            Ok(BracketRow {
                period: record.period,
                category: parse_category(record.category, row)?,
                max_income: record.max_income,
                max_floor_area: record.max_floor_area,
                max_energy: record.max_energy,
                max_rent: record.max_rent,
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Fee components
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeeComponentRecord {
    period: String,
    category: String,
    component_type: String,
    code: String,
    description: String,
    value: Decimal,
    sub_code: Option<String>,
    province_code: Option<String>,
    has_municipal: Option<String>,
    simplified_regime: Option<String>,
}

pub struct FeeComponentLoader;

impl FeeComponentLoader {
    /// Parse `fee_components.csv` rows. Rows are returned in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<FeeComponentRow>, LoadError> {
        parse_rows(reader, Self::convert)
    }

    fn convert(
        record: FeeComponentRecord,
        row: usize,
    ) -> Result<FeeComponentRow, LoadError> {
        let kind = match record.component_type.as_str() {
            "TAX" => {
                let sub_code = required("sub_code", record.sub_code, row)?;
                let activity = TaxSubCode::parse(&sub_code).ok_or(LoadError::InvalidValue {
                    column: "sub_code",
                    value: sub_code,
                    row,
                })?;
                FeeComponentKind::Tax { activity }
            }
            "PENSION" => {
                let sub_code = required("sub_code", record.sub_code, row)?;
                let variant = PensionVariant::parse(&sub_code).ok_or(LoadError::InvalidValue {
                    column: "sub_code",
                    value: sub_code,
                    row,
                })?;
                FeeComponentKind::Pension { variant }
            }
            "HEALTH" => FeeComponentKind::Health,
            "PROVINCIAL_LEVY" => FeeComponentKind::ProvincialLevy {
                province_code: required("province_code", record.province_code, row)?,
                has_municipal: parse_flag("has_municipal", record.has_municipal, row)?,
                simplified_regime: parse_flag("simplified_regime", record.simplified_regime, row)?,
            },
            _ => {
                return Err(LoadError::InvalidValue {
                    column: "component_type",
                    value: record.component_type,
                    row,
                });
            }
        };

        Ok(FeeComponentRow {
            period: record.period,
            category: parse_category(record.category, row)?,
            code: record.code,
            description: record.description,
            value: record.value,
            kind,
        })
    }
}

// ---------------------------------------------------------------------------
// Taxpayers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TaxpayerRecord {
    period: String,
    taxpayer_id: String,
    name: String,
    activity: String,
    province_code: String,
    works_in_rd: Option<String>,
    is_retired: Option<String>,
    dependents: Option<u8>,
    floor_area: Option<Decimal>,
    annual_rent: Option<Decimal>,
    annual_energy: Option<Decimal>,
    annual_sales: Decimal,
    previous_category: Option<String>,
    previous_fee: Option<Decimal>,
}

pub struct TaxpayerLoader;

impl TaxpayerLoader {
    /// Parse `taxpayers.csv` rows. Rows are returned in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxpayerInput>, LoadError> {
        parse_rows(reader, Self::convert)
    }

    fn convert(
        record: TaxpayerRecord,
        row: usize,
    ) -> Result<TaxpayerInput, LoadError> {
        let activity = Activity::parse(&record.activity).ok_or(LoadError::InvalidValue {
            column: "activity",
            value: record.activity,
            row,
        })?;

        let dependents = record.dependents.unwrap_or(0);
        if dependents > MAX_DEPENDENTS {
            return Err(LoadError::TooManyDependents { dependents, row });
        }

        let previous_category = match record.previous_category {
            Some(letter) if !letter.is_empty() => Some(parse_category(letter, row)?),
            _ => None,
        };

        Ok(TaxpayerInput {
            taxpayer_id: required("taxpayer_id", Some(record.taxpayer_id), row)?,
            name: record.name,
            period: record.period,
            activity,
            province_code: record.province_code,
            works_in_rd: parse_flag("works_in_rd", record.works_in_rd, row)?,
            is_retired: parse_flag("is_retired", record.is_retired, row)?,
            dependents,
            floor_area: record.floor_area,
            annual_rent: record.annual_rent,
            annual_energy: record.annual_energy,
            annual_sales: record.annual_sales,
            previous_category,
            previous_fee: record.previous_fee,
        })
    }
}
