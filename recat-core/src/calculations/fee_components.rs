//! Monthly fee composition for a resolved bracket.
//!
//! The fee is built from five independent components:
//!
//! | Component       | Eligibility                               | Row looked up                          |
//! |-----------------|-------------------------------------------|----------------------------------------|
//! | Tax             | every activity except `LeaseSmall`        | goods-tax / services-tax at own bracket |
//! | Pension         | not dependent labor, not `LeaseSmall`     | retiree minimum at A, else standard at own bracket |
//! | Health          | not dependent labor, not `LeaseSmall`     | base row at own bracket × (1 + dependents) |
//! | Provincial levy | a levy row exists for the province        | province code at own bracket           |
//! | Municipal levy  | provincial row flags a municipal levy     | row code `<province>_MUNI` at own bracket |
//!
//! Tax, pension and health always produce a line, with `applied = false` and
//! a reason when the taxpayer is not eligible. Provincial and municipal levies
//! produce no line at all when no row is configured.
//!
//! Missing rows never fail the calculation. They produce a zero, not-applied
//! line without a reason (or no line for levies) and a warning in the log.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Activity, BracketLetter, FeeComponentRow, PensionVariant, TaxSubCode, TaxpayerInput};

/// Retirees pay the pension floor regardless of their own bracket.
pub const RETIREE_PENSION_BRACKET: BracketLetter = BracketLetter::A;

/// Type of a computed fee line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Tax,
    Pension,
    Health,
    ProvincialLevy,
    MunicipalLevy,
}

impl ComponentType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Tax => "TAX",
            Self::Pension => "PENSION",
            Self::Health => "HEALTH",
            Self::ProvincialLevy => "PROVINCIAL_LEVY",
            Self::MunicipalLevy => "MUNICIPAL_LEVY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tax => "Tax component",
            Self::Pension => "Pension contribution",
            Self::Health => "Health insurance",
            Self::ProvincialLevy => "Provincial levy",
            Self::MunicipalLevy => "Municipal levy",
        }
    }
}

/// Why an eligibility gate excluded a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotAppliedReason {
    DependentEmployment,
    SmallLessor,
}

impl fmt::Display for NotAppliedReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::DependentEmployment => f.write_str("employed under dependent labor"),
            Self::SmallLessor => f.write_str("lessor of ≤2 properties"),
        }
    }
}

/// One line of the fee breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLine {
    pub code: String,
    pub description: String,
    pub component_type: ComponentType,
    pub value: Decimal,
    pub applied: bool,
    /// Set when an eligibility gate excluded the component. A not-applied
    /// line without a reason means the period has no row for it.
    pub reason: Option<NotAppliedReason>,
}

impl ComponentLine {
    fn applied(
        component_type: ComponentType,
        code: &str,
        description: String,
        value: Decimal,
    ) -> Self {
        Self {
            code: code.to_string(),
            description,
            component_type,
            value,
            applied: true,
            reason: None,
        }
    }

    fn not_applied(
        component_type: ComponentType,
        code: &str,
        reason: Option<NotAppliedReason>,
    ) -> Self {
        Self {
            code: code.to_string(),
            description: component_type.label().to_string(),
            component_type,
            value: Decimal::ZERO,
            applied: false,
            reason,
        }
    }

    /// Value counted towards the subtotal: zero unless applied.
    pub fn applied_value(&self) -> Decimal {
        if self.applied { self.value } else { Decimal::ZERO }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSubtotals {
    pub tax: Decimal,
    pub pension: Decimal,
    pub health: Decimal,
    pub provincial: Decimal,
    pub municipal: Decimal,
}

impl FeeSubtotals {
    pub fn total(&self) -> Decimal {
        self.tax + self.pension + self.health + self.provincial + self.municipal
    }
}

/// Result of composing the fee for one taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeComponentsResult {
    /// Lines in component order: tax, pension, health, provincial, municipal.
    pub components: Vec<ComponentLine>,
    pub subtotals: FeeSubtotals,
}

/// Taxpayer facts the fee calculation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeComponentInput<'a> {
    pub category: BracketLetter,
    pub activity: Activity,
    pub province_code: &'a str,
    pub works_in_rd: bool,
    pub is_retired: bool,
    pub dependents: u8,
}

impl<'a> FeeComponentInput<'a> {
    pub fn for_taxpayer(
        taxpayer: &'a TaxpayerInput,
        category: BracketLetter,
    ) -> Self {
        Self {
            category,
            activity: taxpayer.activity,
            province_code: &taxpayer.province_code,
            works_in_rd: taxpayer.works_in_rd,
            is_retired: taxpayer.is_retired,
            dependents: taxpayer.dependents,
        }
    }

    /// Gate shared by pension and health. Dependent labor takes precedence.
    fn social_security_exclusion(&self) -> Option<NotAppliedReason> {
        if self.works_in_rd {
            Some(NotAppliedReason::DependentEmployment)
        } else if self.activity == Activity::LeaseSmall {
            Some(NotAppliedReason::SmallLessor)
        } else {
            None
        }
    }
}

/// Tax row priced for an activity, if the activity pays the tax component.
fn tax_sub_code(activity: Activity) -> Option<TaxSubCode> {
    match activity {
        Activity::Goods => Some(TaxSubCode::Goods),
        Activity::Services | Activity::Lease => Some(TaxSubCode::Services),
        Activity::LeaseSmall => None,
    }
}

/// Composes monthly fees against one period's fee component table.
#[derive(Debug, Clone)]
pub struct FeeComponentCalculator<'a> {
    rows: &'a [FeeComponentRow],
}

impl<'a> FeeComponentCalculator<'a> {
    pub fn new(rows: &'a [FeeComponentRow]) -> Self {
        Self { rows }
    }

    pub fn calculate(
        &self,
        input: &FeeComponentInput<'_>,
    ) -> FeeComponentsResult {
        let tax = self.tax_line(input);
        let pension = self.pension_line(input);
        let health = self.health_line(input);

        let provincial_row = self.find(input.category, |row| {
            row.is_provincial_levy_of(input.province_code)
        });
        let provincial = provincial_row.map(|row| {
            let description = if row.is_simplified_regime() {
                format!("{} (simplified regime)", row.description)
            } else {
                row.description.clone()
            };
            ComponentLine::applied(ComponentType::ProvincialLevy, &row.code, description, row.value)
        });
        let municipal = provincial_row
            .filter(|row| row.has_municipal_counterpart())
            .and_then(|row| self.municipal_line(row, input));

        let levy_value = |line: &Option<ComponentLine>| {
            line.as_ref()
                .map_or(Decimal::ZERO, ComponentLine::applied_value)
        };
        let subtotals = FeeSubtotals {
            tax: tax.applied_value(),
            pension: pension.applied_value(),
            health: health.applied_value(),
            provincial: levy_value(&provincial),
            municipal: levy_value(&municipal),
        };

        let components = [Some(tax), Some(pension), Some(health), provincial, municipal]
            .into_iter()
            .flatten()
            .collect();

        FeeComponentsResult {
            components,
            subtotals,
        }
    }

    fn find(
        &self,
        category: BracketLetter,
        predicate: impl Fn(&FeeComponentRow) -> bool,
    ) -> Option<&'a FeeComponentRow> {
        self.rows
            .iter()
            .find(|row| row.category == category && predicate(*row))
    }

    fn tax_line(
        &self,
        input: &FeeComponentInput<'_>,
    ) -> ComponentLine {
        let Some(sub_code) = tax_sub_code(input.activity) else {
            return ComponentLine::not_applied(
                ComponentType::Tax,
                ComponentType::Tax.code(),
                Some(NotAppliedReason::SmallLessor),
            );
        };

        match self.find(input.category, |row| row.is_tax(sub_code)) {
            Some(row) => ComponentLine::applied(
                ComponentType::Tax,
                &row.code,
                row.description.clone(),
                row.value,
            ),
            None => {
                warn!(
                    sub_code = sub_code.as_str(),
                    category = %input.category,
                    "no tax row configured"
                );
                ComponentLine::not_applied(ComponentType::Tax, sub_code.as_str(), None)
            }
        }
    }

    fn pension_line(
        &self,
        input: &FeeComponentInput<'_>,
    ) -> ComponentLine {
        if let Some(reason) = input.social_security_exclusion() {
            return ComponentLine::not_applied(
                ComponentType::Pension,
                ComponentType::Pension.code(),
                Some(reason),
            );
        }

        let (variant, category) = if input.is_retired {
            (PensionVariant::RetireeMinimum, RETIREE_PENSION_BRACKET)
        } else {
            (PensionVariant::Standard, input.category)
        };

        match self.find(category, |row| row.is_pension(variant)) {
            Some(row) => ComponentLine::applied(
                ComponentType::Pension,
                &row.code,
                row.description.clone(),
                row.value,
            ),
            None => {
                warn!(
                    variant = variant.as_str(),
                    %category,
                    "no pension row configured"
                );
                ComponentLine::not_applied(ComponentType::Pension, variant.as_str(), None)
            }
        }
    }

    fn health_line(
        &self,
        input: &FeeComponentInput<'_>,
    ) -> ComponentLine {
        if let Some(reason) = input.social_security_exclusion() {
            return ComponentLine::not_applied(
                ComponentType::Health,
                ComponentType::Health.code(),
                Some(reason),
            );
        }

        let Some(row) = self.find(input.category, FeeComponentRow::is_health) else {
            warn!(category = %input.category, "no health insurance row configured");
            return ComponentLine::not_applied(
                ComponentType::Health,
                ComponentType::Health.code(),
                None,
            );
        };

        let factor = 1 + u32::from(input.dependents);
        let description = match input.dependents {
            0 => row.description.clone(),
            1 => format!("{} ×{factor} (1 dependent)", row.description),
            n => format!("{} ×{factor} ({n} dependents)", row.description),
        };

        ComponentLine::applied(
            ComponentType::Health,
            &row.code,
            description,
            row.value * Decimal::from(factor),
        )
    }

    fn municipal_line(
        &self,
        provincial: &FeeComponentRow,
        input: &FeeComponentInput<'_>,
    ) -> Option<ComponentLine> {
        let Some(row) = self.find(input.category, |row| {
            row.is_municipal_levy_of(input.province_code)
        }) else {
            warn!(
                province = input.province_code,
                category = %input.category,
                "provincial levy announces a municipal levy that is not configured"
            );
            return None;
        };

        Some(ComponentLine::applied(
            ComponentType::MunicipalLevy,
            &row.code,
            format!("{} (municipal)", provincial.description),
            row.value,
        ))
    }
}
