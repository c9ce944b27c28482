//! Recategorization engine.
//!
//! The three components run in strict order for every taxpayer:
//! [`CategoryResolver`] picks the bracket, [`FeeComponentCalculator`] prices
//! the fee components for that bracket, and [`Recategorizer`] totals the fee
//! and compares it with the previous recategorization. All of them are pure
//! functions of the tables they borrow.

pub mod category;
pub mod common;
pub mod config_check;
pub mod fee_components;
pub mod recategorization;

pub use category::{CategoryDetails, CategoryResolver, CategoryResult, ParameterDetail};
pub use config_check::{CeilingParameter, ConfigIssue, check_period_config};
pub use fee_components::{
    ComponentLine, ComponentType, FeeComponentCalculator, FeeComponentInput, FeeComponentsResult,
    FeeSubtotals, NotAppliedReason, RETIREE_PENSION_BRACKET,
};
pub use recategorization::{
    BatchReport, BatchSummary, CategoryChange, Comparison, RecategorizationResult, Recategorizer,
};
