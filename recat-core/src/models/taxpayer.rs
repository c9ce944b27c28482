use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BracketLetter;

/// Most health insurance dependents a taxpayer may declare.
pub const MAX_DEPENDENTS: u8 = 6;

/// Activity classification of a taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Goods,
    Services,
    Lease,
    /// Lessor of at most two properties.
    LeaseSmall,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goods => "GOODS",
            Self::Services => "SERVICES",
            Self::Lease => "LEASE",
            Self::LeaseSmall => "LEASE_SMALL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GOODS" => Some(Self::Goods),
            "SERVICES" => Some(Self::Services),
            "LEASE" => Some(Self::Lease),
            "LEASE_SMALL" => Some(Self::LeaseSmall),
            _ => None,
        }
    }
}

/// The four raw parameters that drive bracket resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryParams {
    pub income: Option<Decimal>,
    pub floor_area: Option<Decimal>,
    pub energy: Option<Decimal>,
    pub rent: Option<Decimal>,
}

/// Snapshot of one taxpayer for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerInput {
    pub taxpayer_id: String,
    pub name: String,
    pub period: String,
    pub activity: Activity,
    pub province_code: String,
    /// Employed under a dependent labor contract.
    pub works_in_rd: bool,
    pub is_retired: bool,
    /// Health insurance dependents, 0 to 6.
    pub dependents: u8,
    pub floor_area: Option<Decimal>,
    pub annual_rent: Option<Decimal>,
    pub annual_energy: Option<Decimal>,
    /// Summed sales of the period, used as annual income.
    pub annual_sales: Decimal,

    // Comparison only; never feeds the new calculation
    pub previous_category: Option<BracketLetter>,
    pub previous_fee: Option<Decimal>,
}

impl TaxpayerInput {
    pub fn category_params(&self) -> CategoryParams {
        CategoryParams {
            income: Some(self.annual_sales),
            floor_area: self.floor_area,
            energy: self.annual_energy,
            rent: self.annual_rent,
        }
    }
}
