use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BracketLetter;

/// Marker appended to a province code to address its municipal levy rows.
pub const MUNICIPAL_SUFFIX: &str = "_MUNI";

/// Activity priced by a tax row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxSubCode {
    Goods,
    Services,
}

impl TaxSubCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goods => "goods-tax",
            Self::Services => "services-tax",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "goods-tax" => Some(Self::Goods),
            "services-tax" => Some(Self::Services),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PensionVariant {
    /// Regular contribution, priced at the taxpayer's own bracket.
    Standard,
    /// Floor contribution for retirees, always priced at bracket A.
    RetireeMinimum,
}

impl PensionVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::RetireeMinimum => "retiree",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(Self::Standard),
            "retiree" => Some(Self::RetireeMinimum),
            _ => None,
        }
    }
}

/// Type tag of a fee component row and the fields specific to each type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeComponentKind {
    Tax {
        activity: TaxSubCode,
    },
    Pension {
        variant: PensionVariant,
    },
    Health,
    ProvincialLevy {
        province_code: String,
        has_municipal: bool,
        /// Levy is collected through the simplified national tax. Shown on
        /// the provincial line; the arithmetic ignores it.
        simplified_regime: bool,
    },
}

impl FeeComponentKind {
    pub fn type_code(&self) -> &'static str {
        match self {
            Self::Tax { .. } => "TAX",
            Self::Pension { .. } => "PENSION",
            Self::Health => "HEALTH",
            Self::ProvincialLevy { .. } => "PROVINCIAL_LEVY",
        }
    }
}

/// One priced fee component for one bracket of one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeComponentRow {
    pub period: String,
    pub category: BracketLetter,
    pub code: String,
    pub description: String,
    pub value: Decimal,
    pub kind: FeeComponentKind,
}

impl FeeComponentRow {
    pub fn is_tax(
        &self,
        sub_code: TaxSubCode,
    ) -> bool {
        matches!(self.kind, FeeComponentKind::Tax { activity } if activity == sub_code)
    }

    pub fn is_pension(
        &self,
        variant: PensionVariant,
    ) -> bool {
        matches!(self.kind, FeeComponentKind::Pension { variant: v } if v == variant)
    }

    pub fn is_health(&self) -> bool {
        matches!(self.kind, FeeComponentKind::Health)
    }

    /// Returns the province code when this is a levy row.
    pub fn levy_province(&self) -> Option<&str> {
        match &self.kind {
            FeeComponentKind::ProvincialLevy { province_code, .. } => Some(province_code),
            _ => None,
        }
    }

    /// Levy row configured under a municipal code (`<province>_MUNI`).
    pub fn is_municipal_levy(&self) -> bool {
        self.levy_province().is_some() && self.code.ends_with(MUNICIPAL_SUFFIX)
    }

    /// Provincial levy row of `province_code`. Municipal rows never match,
    /// whatever province they carry.
    pub fn is_provincial_levy_of(
        &self,
        province_code: &str,
    ) -> bool {
        self.levy_province() == Some(province_code) && !self.is_municipal_levy()
    }

    /// Municipal levy row of `province_code`, matched on the row code.
    pub fn is_municipal_levy_of(
        &self,
        province_code: &str,
    ) -> bool {
        self.levy_province().is_some() && self.code == municipal_code(province_code)
    }

    pub fn is_simplified_regime(&self) -> bool {
        matches!(
            self.kind,
            FeeComponentKind::ProvincialLevy {
                simplified_regime: true,
                ..
            }
        )
    }

    pub fn has_municipal_counterpart(&self) -> bool {
        matches!(
            self.kind,
            FeeComponentKind::ProvincialLevy {
                has_municipal: true,
                ..
            }
        )
    }
}

/// Code under which the municipal levy of `province_code` is configured.
pub fn municipal_code(province_code: &str) -> String {
    format!("{province_code}{MUNICIPAL_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn levy_row(has_municipal: bool) -> FeeComponentRow {
        FeeComponentRow {
            period: "2025-2".to_string(),
            category: BracketLetter::A,
            code: "IIBB-CBA".to_string(),
            description: "Ingresos brutos Córdoba".to_string(),
            value: dec!(5000),
            kind: FeeComponentKind::ProvincialLevy {
                province_code: "CBA".to_string(),
                has_municipal,
                simplified_regime: false,
            },
        }
    }

    #[test]
    fn sub_codes_round_trip_through_text() {
        assert_eq!(TaxSubCode::parse("goods-tax"), Some(TaxSubCode::Goods));
        assert_eq!(TaxSubCode::parse("services-tax"), Some(TaxSubCode::Services));
        assert_eq!(TaxSubCode::parse("lease-tax"), None);
        assert_eq!(PensionVariant::parse("retiree"), Some(PensionVariant::RetireeMinimum));
        assert_eq!(PensionVariant::parse("other"), None);
    }

    #[test]
    fn levy_accessors_expose_province_fields() {
        let row = levy_row(true);

        assert_eq!(row.levy_province(), Some("CBA"));
        assert!(row.has_municipal_counterpart());
        assert!(!levy_row(false).has_municipal_counterpart());
        assert_eq!(row.kind.type_code(), "PROVINCIAL_LEVY");
    }

    #[test]
    fn municipal_code_appends_marker() {
        assert_eq!(municipal_code("CBA"), "CBA_MUNI");
    }

    #[test]
    fn municipal_row_is_keyed_on_code() {
        let provincial = levy_row(true);
        let mut municipal = levy_row(false);
        municipal.code = "CBA_MUNI".to_string();

        assert!(municipal.is_municipal_levy());
        assert!(municipal.is_municipal_levy_of("CBA"));
        assert!(!municipal.is_provincial_levy_of("CBA"));
        assert!(provincial.is_provincial_levy_of("CBA"));
        assert!(!provincial.is_municipal_levy_of("CBA"));
        assert!(!municipal.is_municipal_levy_of("MZA"));
    }
}
