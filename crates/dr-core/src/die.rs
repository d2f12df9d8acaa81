//! Polyhedral die types.
//!
//! The supported set is closed: d4, d6, d8, d10, d12, d20 and d100. Each
//! variant carries its face count, which is what gets persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiceError;

/// A polyhedral die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    /// Four-sided die.
    D4,
    /// Six-sided die.
    #[default]
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die.
    D20,
    /// Percentile die (1-100).
    D100,
}

impl DieType {
    /// Every supported die type, smallest first.
    pub const ALL: [DieType; 7] = [
        Self::D4,
        Self::D6,
        Self::D8,
        Self::D10,
        Self::D12,
        Self::D20,
        Self::D100,
    ];

    /// Returns the number of faces on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
        }
    }

    /// Look up the die type with the given face count.
    pub fn from_sides(sides: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.sides() == sides)
    }

    /// Short display name, e.g. "d6".
    pub fn name(self) -> String {
        format!("d{}", self.sides())
    }

    /// Long description, e.g. "6-sided die".
    pub fn description(self) -> String {
        format!("{}-sided die", self.sides())
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl FromStr for DieType {
    type Err = DiceError;

    /// Parse "d20", "D6" or a bare face count like "100".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        let digits = tag.strip_prefix('d').unwrap_or(&tag);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Self::from_sides)
            .ok_or_else(|| DiceError::UnknownDie(s.trim().to_string()))
    }
}
