mod bracket;
mod fee_component;
mod taxpayer;

pub use bracket::{BracketLetter, BracketRow};
pub use fee_component::{
    FeeComponentKind, FeeComponentRow, MUNICIPAL_SUFFIX, PensionVariant, TaxSubCode,
    municipal_code,
};
pub use taxpayer::{Activity, CategoryParams, MAX_DEPENDENTS, TaxpayerInput};
