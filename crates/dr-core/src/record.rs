//! Persisted records of completed rolls.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::die::DieType;
use crate::error::{DiceError, DiceResult};

/// Unique identifier for a roll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollId(pub Uuid);

impl RollId {
    /// Generate a new random roll ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The first eight hex digits, used for display and prefix lookup.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RollId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RollId {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| DiceError::InvalidArgument(format!("invalid roll id '{s}': {e}")))
    }
}

/// The finalized result set of a roll, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedRoll {
    /// The die type that was rolled.
    pub die: DieType,
    /// Per-die values, in die order.
    pub results: Vec<u32>,
}

impl CompletedRoll {
    /// Sum of all die values.
    pub fn total(&self) -> u32 {
        self.results.iter().sum()
    }

    /// Turn this result set into a record stamped with the current time.
    pub fn to_record(&self) -> DiceResult<RollRecord> {
        RollRecord::new(self.results.clone(), self.die)
    }
}

/// An immutable snapshot of one completed roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    id: RollId,
    timestamp: DateTime<Utc>,
    results: Vec<u32>,
    die_type: u32,
}

impl RollRecord {
    /// Record a roll that completed just now.
    pub fn new(results: Vec<u32>, die: DieType) -> DiceResult<Self> {
        Self::at(Utc::now(), results, die)
    }

    /// Record a roll with an explicit timestamp.
    ///
    /// `results` must be non-empty and every value must lie on the die.
    pub fn at(timestamp: DateTime<Utc>, results: Vec<u32>, die: DieType) -> DiceResult<Self> {
        let record = Self {
            id: RollId::new(),
            timestamp,
            results,
            die_type: die.sides(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the record invariants. Used after deserializing untrusted data.
    pub fn validate(&self) -> DiceResult<()> {
        if self.results.is_empty() {
            return Err(DiceError::InvalidArgument(
                "a roll record needs at least one result".into(),
            ));
        }
        if DieType::from_sides(self.die_type).is_none() {
            return Err(DiceError::InvalidArgument(format!(
                "d{} is not a supported die",
                self.die_type
            )));
        }
        if let Some(bad) = self
            .results
            .iter()
            .find(|&&v| v == 0 || v > self.die_type)
        {
            return Err(DiceError::InvalidArgument(format!(
                "result {bad} is not on a d{}",
                self.die_type
            )));
        }
        Ok(())
    }

    /// Unique identifier.
    pub fn id(&self) -> RollId {
        self.id
    }

    /// When the roll completed.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Per-die values, in die order.
    pub fn results(&self) -> &[u32] {
        &self.results
    }

    /// Face count of the dice that were rolled.
    pub fn die_type(&self) -> u32 {
        self.die_type
    }

    /// The die type, if the face count is a supported one.
    pub fn die(&self) -> Option<DieType> {
        DieType::from_sides(self.die_type)
    }

    /// Sum of all die values.
    pub fn total(&self) -> u32 {
        self.results.iter().sum()
    }

    /// Number of dice rolled.
    pub fn dice_count(&self) -> usize {
        self.results.len()
    }

    /// Dice notation such as "2d6".
    pub fn notation(&self) -> String {
        format!("{}d{}", self.dice_count(), self.die_type)
    }
}

impl fmt::Display for RollRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.results.iter().map(|v| v.to_string()).collect();
        write!(
            f,
            "{}: [{}] = {}",
            self.notation(),
            values.join(", "),
            self.total()
        )
    }
}
