//! Recategorization of taxpayers for a period.
//!
//! [`Recategorizer`] runs the [`CategoryResolver`] and the
//! [`FeeComponentCalculator`] for one taxpayer, adds the five subtotals into
//! the total fee and compares the outcome with the previously recorded
//! bracket and fee.
//!
//! | Previous bracket | New vs previous position | Change |
//! |------------------|--------------------------|--------|
//! | absent           | -                        | `New`  |
//! | present          | higher                   | `Up`   |
//! | present          | lower                    | `Down` |
//! | present          | equal                    | `Same` |
//!
//! The tables of a period are borrowed once and reused for every taxpayer;
//! taxpayers never affect each other.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculations::category::{CategoryResolver, CategoryResult};
use crate::calculations::common::percent_change;
use crate::calculations::fee_components::{
    FeeComponentCalculator, FeeComponentInput, FeeComponentsResult,
};
use crate::{BracketLetter, BracketRow, FeeComponentRow, TaxpayerInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryChange {
    Up,
    Down,
    Same,
    New,
}

impl CategoryChange {
    pub fn classify(
        previous: Option<BracketLetter>,
        current: BracketLetter,
    ) -> Self {
        let Some(previous) = previous else {
            return Self::New;
        };

        match current.ordinal().cmp(&previous.ordinal()) {
            std::cmp::Ordering::Greater => Self::Up,
            std::cmp::Ordering::Less => Self::Down,
            std::cmp::Ordering::Equal => Self::Same,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Same => "SAME",
            Self::New => "NEW",
        }
    }
}

/// Previous values carried through next to the derived change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub previous_category: Option<BracketLetter>,
    pub previous_fee: Option<Decimal>,
    pub change: CategoryChange,
    /// Total fee minus the previous fee (zero when absent).
    pub fee_delta: Decimal,
    /// `None` for new taxpayers, or when no usable previous fee exists.
    pub percent_delta: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecategorizationResult {
    pub taxpayer_id: String,
    pub name: String,
    pub category: CategoryResult,
    pub fees: FeeComponentsResult,
    pub total_fee: Decimal,
    pub comparison: Comparison,
}

/// Totals over a batch of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub taxpayers: usize,
    pub up: usize,
    pub down: usize,
    pub same: usize,
    pub new: usize,
    pub total_previous_fees: Decimal,
    pub total_fees: Decimal,
}

impl BatchSummary {
    pub fn from_results(results: &[RecategorizationResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.taxpayers += 1;
            match result.comparison.change {
                CategoryChange::Up => summary.up += 1,
                CategoryChange::Down => summary.down += 1,
                CategoryChange::Same => summary.same += 1,
                CategoryChange::New => summary.new += 1,
            }
            summary.total_previous_fees += result.comparison.previous_fee.unwrap_or_default();
            summary.total_fees += result.total_fee;
            summary
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub period: String,
    pub results: Vec<RecategorizationResult>,
    pub summary: BatchSummary,
}

/// Recategorizes taxpayers against one period's tables.
#[derive(Debug, Clone)]
pub struct Recategorizer<'a> {
    resolver: CategoryResolver<'a>,
    calculator: FeeComponentCalculator<'a>,
}

impl<'a> Recategorizer<'a> {
    pub fn new(
        brackets: &'a [BracketRow],
        fee_rows: &'a [FeeComponentRow],
    ) -> Self {
        Self {
            resolver: CategoryResolver::new(brackets),
            calculator: FeeComponentCalculator::new(fee_rows),
        }
    }

    pub fn recategorize(
        &self,
        taxpayer: &TaxpayerInput,
    ) -> RecategorizationResult {
        let category = self.resolver.resolve(&taxpayer.category_params());
        let fees = self.calculator.calculate(&FeeComponentInput::for_taxpayer(
            taxpayer,
            category.final_category,
        ));
        let total_fee = fees.subtotals.total();
        let comparison = self.compare(taxpayer, category.final_category, total_fee);

        debug!(
            taxpayer = %taxpayer.taxpayer_id,
            category = %category.final_category,
            %total_fee,
            change = comparison.change.as_str(),
            "recategorized"
        );

        RecategorizationResult {
            taxpayer_id: taxpayer.taxpayer_id.clone(),
            name: taxpayer.name.clone(),
            category,
            fees,
            total_fee,
            comparison,
        }
    }

    /// Recategorizes every taxpayer, preserving input order.
    pub fn recategorize_all(
        &self,
        period: &str,
        taxpayers: &[TaxpayerInput],
    ) -> BatchReport {
        let results: Vec<_> = taxpayers.iter().map(|t| self.recategorize(t)).collect();
        let summary = BatchSummary::from_results(&results);

        info!(
            period,
            taxpayers = summary.taxpayers,
            up = summary.up,
            down = summary.down,
            same = summary.same,
            new = summary.new,
            "recategorization batch complete"
        );

        BatchReport {
            period: period.to_string(),
            results,
            summary,
        }
    }

    fn compare(
        &self,
        taxpayer: &TaxpayerInput,
        category: BracketLetter,
        total_fee: Decimal,
    ) -> Comparison {
        let change = CategoryChange::classify(taxpayer.previous_category, category);
        let fee_delta = total_fee - taxpayer.previous_fee.unwrap_or(Decimal::ZERO);

        let percent_delta = match (change, taxpayer.previous_fee) {
            (CategoryChange::New, _) | (_, None) => None,
            (_, Some(previous)) => {
                let percent = percent_change(previous, total_fee);
                if percent.is_none() {
                    warn!(
                        taxpayer = %taxpayer.taxpayer_id,
                        previous_fee = %previous,
                        "percentage change against previous fee is undefined"
                    );
                }
                percent
            }
        };

        Comparison {
            previous_category: taxpayer.previous_category,
            previous_fee: taxpayer.previous_fee,
            change,
            fee_delta,
            percent_delta,
        }
    }
}
