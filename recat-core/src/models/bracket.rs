use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bracket identifier ("category").
///
/// Letters are ordered by their position in this enum, never by character
/// value, so comparisons stay correct if the alphabet is extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BracketLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
}

impl BracketLetter {
    pub const LOWEST: Self = Self::A;

    pub const ALL: [Self; 11] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
    ];

    /// Zero-based position in the fixed bracket sequence.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::H => "H",
            Self::I => "I",
            Self::J => "J",
            Self::K => "K",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|letter| letter.as_str() == s)
    }
}

impl fmt::Display for BracketLetter {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ceilings of one bracket within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRow {
    pub period: String,
    pub category: BracketLetter,
    /// Annual gross income ceiling.
    pub max_income: Decimal,
    /// Floor area ceiling in m².
    pub max_floor_area: Decimal,
    /// Annual energy consumption ceiling (kWh).
    pub max_energy: Decimal,
    /// Annual rent paid ceiling.
    pub max_rent: Decimal,
}
