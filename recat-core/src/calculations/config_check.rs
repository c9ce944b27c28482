//! Completeness and consistency checks for a period's tables.
//!
//! The engine never validates its tables and degrades to zero amounts when a
//! row is missing. Callers that want to refuse a broken period before running a
//! batch use [`check_period_config`].

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;

use crate::calculations::fee_components::RETIREE_PENSION_BRACKET;
use crate::{BracketLetter, BracketRow, FeeComponentRow, PensionVariant, TaxSubCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeilingParameter {
    Income,
    FloorArea,
    Energy,
    Rent,
}

impl CeilingParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::FloorArea => "floor area",
            Self::Energy => "energy",
            Self::Rent => "rent",
        }
    }

    fn ceiling(
        &self,
        row: &BracketRow,
    ) -> Decimal {
        match self {
            Self::Income => row.max_income,
            Self::FloorArea => row.max_floor_area,
            Self::Energy => row.max_energy,
            Self::Rent => row.max_rent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    EmptyBracketTable,
    DuplicateBracket(BracketLetter),
    NonMonotonicCeiling {
        parameter: CeilingParameter,
        category: BracketLetter,
        previous: BracketLetter,
    },
    MissingComponent {
        category: BracketLetter,
        component: &'static str,
    },
    MissingRetireeMinimum,
    MissingMunicipalLevy {
        province_code: String,
        category: BracketLetter,
    },
}

impl fmt::Display for ConfigIssue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::EmptyBracketTable => write!(f, "bracket table is empty"),
            Self::DuplicateBracket(category) => {
                write!(f, "bracket {category} is defined more than once")
            }
            Self::NonMonotonicCeiling {
                parameter,
                category,
                previous,
            } => write!(
                f,
                "{} ceiling of bracket {category} is lower than bracket {previous}",
                parameter.as_str()
            ),
            Self::MissingComponent {
                category,
                component,
            } => write!(f, "bracket {category} has no {component} row"),
            Self::MissingRetireeMinimum => write!(
                f,
                "no retiree pension row at bracket {RETIREE_PENSION_BRACKET}"
            ),
            Self::MissingMunicipalLevy {
                province_code,
                category,
            } => write!(
                f,
                "province {province_code} announces a municipal levy at bracket {category} but none is configured"
            ),
        }
    }
}

/// Reports every problem found in one period's bracket and fee tables.
///
/// An empty result means the engine will find a row for every lookup it can
/// make against these tables.
pub fn check_period_config(
    brackets: &[BracketRow],
    fee_rows: &[FeeComponentRow],
) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if brackets.is_empty() {
        issues.push(ConfigIssue::EmptyBracketTable);
        return issues;
    }

    let mut sorted: Vec<&BracketRow> = brackets.iter().collect();
    sorted.sort_by_key(|row| row.category);

    let mut seen = HashSet::new();
    for row in &sorted {
        if !seen.insert(row.category) {
            issues.push(ConfigIssue::DuplicateBracket(row.category));
        }
    }

    for pair in sorted.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        for parameter in [
            CeilingParameter::Income,
            CeilingParameter::FloorArea,
            CeilingParameter::Energy,
            CeilingParameter::Rent,
        ] {
            if parameter.ceiling(current) < parameter.ceiling(previous) {
                issues.push(ConfigIssue::NonMonotonicCeiling {
                    parameter,
                    category: current.category,
                    previous: previous.category,
                });
            }
        }
    }

    let has_row = |category: BracketLetter, predicate: &dyn Fn(&FeeComponentRow) -> bool| {
        fee_rows
            .iter()
            .any(|row| row.category == category && predicate(row))
    };

    let mut categories: Vec<BracketLetter> = seen.into_iter().collect();
    categories.sort();
    for category in categories {
        let required: [(&'static str, fn(&FeeComponentRow) -> bool); 4] = [
            (TaxSubCode::Goods.as_str(), |row: &FeeComponentRow| {
                row.is_tax(TaxSubCode::Goods)
            }),
            (TaxSubCode::Services.as_str(), |row: &FeeComponentRow| {
                row.is_tax(TaxSubCode::Services)
            }),
            ("standard pension", |row: &FeeComponentRow| {
                row.is_pension(PensionVariant::Standard)
            }),
            ("health insurance", FeeComponentRow::is_health),
        ];
        for (component, predicate) in required {
            if !has_row(category, &predicate) {
                issues.push(ConfigIssue::MissingComponent {
                    category,
                    component,
                });
            }
        }
    }

    if !has_row(RETIREE_PENSION_BRACKET, &|row: &FeeComponentRow| {
        row.is_pension(PensionVariant::RetireeMinimum)
    }) {
        issues.push(ConfigIssue::MissingRetireeMinimum);
    }

    let provincial_rows = fee_rows
        .iter()
        .filter(|row| row.has_municipal_counterpart() && !row.is_municipal_levy());
    for row in provincial_rows {
        let Some(province_code) = row.levy_province() else {
            continue;
        };
        if !has_row(row.category, &|r: &FeeComponentRow| {
            r.is_municipal_levy_of(province_code)
        }) {
            issues.push(ConfigIssue::MissingMunicipalLevy {
                province_code: province_code.to_string(),
                category: row.category,
            });
        }
    }

    issues
}
