//! Bracket ("category") resolution.
//!
//! Each of the four parameters is resolved against the bracket table on its
//! own, and the final bracket is the highest of the four:
//!
//! | Parameter  | Ceiling column     |
//! |------------|--------------------|
//! | income     | `max_income`       |
//! | floor area | `max_floor_area`   |
//! | energy     | `max_energy`       |
//! | rent       | `max_rent`         |
//!
//! A parameter that is absent or not positive always resolves to bracket A.
//! A parameter above every ceiling resolves to the highest bracket defined in
//! the table. Neither case is an error.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use recat_core::calculations::CategoryResolver;
//! use recat_core::{BracketLetter, BracketRow, CategoryParams};
//!
//! let row = |category, max_income, max_floor_area| BracketRow {
//!     period: "2025-2".to_string(),
//!     category,
//!     max_income,
//!     max_floor_area,
//!     max_energy: dec!(3330),
//!     max_rent: dec!(2000000),
//! };
//! let brackets = vec![
//!     row(BracketLetter::A, dec!(9000000), dec!(30)),
//!     row(BracketLetter::B, dec!(13000000), dec!(45)),
//! ];
//!
//! let params = CategoryParams {
//!     income: Some(dec!(5000000)),
//!     floor_area: Some(dec!(40)),
//!     ..Default::default()
//! };
//!
//! let result = CategoryResolver::new(&brackets).resolve(&params);
//!
//! assert_eq!(result.by_income, BracketLetter::A);
//! assert_eq!(result.by_floor_area, BracketLetter::B);
//! assert_eq!(result.final_category, BracketLetter::B);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{BracketLetter, BracketRow, CategoryParams};

/// A taxpayer's value for one parameter next to the ceiling of the final bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDetail {
    pub value: Decimal,
    pub limit: Decimal,
}

impl ParameterDetail {
    /// Room left under the final bracket's ceiling, never negative.
    pub fn headroom(&self) -> Decimal {
        (self.limit - self.value).max(Decimal::ZERO)
    }
}

/// Audit detail for every parameter, taken from the final bracket's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetails {
    pub income: ParameterDetail,
    pub floor_area: ParameterDetail,
    pub energy: ParameterDetail,
    pub rent: ParameterDetail,
}

/// Result of resolving a taxpayer's bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub by_income: BracketLetter,
    pub by_floor_area: BracketLetter,
    pub by_energy: BracketLetter,
    pub by_rent: BracketLetter,

    /// Highest of the four per-parameter brackets.
    pub final_category: BracketLetter,

    pub details: CategoryDetails,
}

/// Resolves brackets against one period's bracket table.
#[derive(Debug, Clone)]
pub struct CategoryResolver<'a> {
    /// Rows sorted ascending by bracket position.
    brackets: Vec<&'a BracketRow>,
}

impl<'a> CategoryResolver<'a> {
    /// Creates a resolver over `brackets`. Rows may be given in any order.
    pub fn new(brackets: &'a [BracketRow]) -> Self {
        let mut sorted: Vec<&BracketRow> = brackets.iter().collect();
        sorted.sort_by_key(|row| row.category);
        Self { brackets: sorted }
    }

    pub fn resolve(
        &self,
        params: &CategoryParams,
    ) -> CategoryResult {
        let by_income = self.bracket_for(params.income, |row| row.max_income);
        let by_floor_area = self.bracket_for(params.floor_area, |row| row.max_floor_area);
        let by_energy = self.bracket_for(params.energy, |row| row.max_energy);
        let by_rent = self.bracket_for(params.rent, |row| row.max_rent);

        let final_category = by_income.max(by_floor_area).max(by_energy).max(by_rent);

        CategoryResult {
            by_income,
            by_floor_area,
            by_energy,
            by_rent,
            final_category,
            details: self.details(params, final_category),
        }
    }

    /// First bracket whose ceiling is at or above `value`.
    fn bracket_for(
        &self,
        value: Option<Decimal>,
        ceiling: impl Fn(&BracketRow) -> Decimal,
    ) -> BracketLetter {
        let Some(value) = value.filter(|v| *v > Decimal::ZERO) else {
            return BracketLetter::LOWEST;
        };

        self.brackets
            .iter()
            .find(|row| ceiling(**row) >= value)
            .or_else(|| self.brackets.last())
            .map_or(BracketLetter::LOWEST, |row| row.category)
    }

    fn details(
        &self,
        params: &CategoryParams,
        category: BracketLetter,
    ) -> CategoryDetails {
        let row = self.brackets.iter().find(|row| row.category == category);
        if row.is_none() {
            warn!(%category, "no bracket row for final category, reporting zero limits");
        }

        let detail = |value: Option<Decimal>, ceiling: fn(&BracketRow) -> Decimal| ParameterDetail {
            value: value.unwrap_or(Decimal::ZERO),
            limit: row.map_or(Decimal::ZERO, |row| ceiling(*row)),
        };

        CategoryDetails {
            income: detail(params.income, |row| row.max_income),
            floor_area: detail(params.floor_area, |row| row.max_floor_area),
            energy: detail(params.energy, |row| row.max_energy),
            rent: detail(params.rent, |row| row.max_rent),
        }
    }
}
