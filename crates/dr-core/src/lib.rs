//! Core types for Dice Roll.
//!
//! Provides the polyhedral [`DieType`] set, a uniform [`DieRoller`] backed by
//! a seedable RNG, and the immutable [`RollRecord`] persisted for every
//! completed roll.

pub mod die;
pub mod error;
pub mod record;
pub mod roller;

pub use die::DieType;
pub use error::{DiceError, DiceResult};
pub use record::{CompletedRoll, RollId, RollRecord};
pub use roller::DieRoller;

/// Smallest number of dice a single roll may use.
pub const MIN_DICE: u32 = 1;

/// Largest number of dice a single roll may use.
pub const MAX_DICE: u32 = 6;

/// Check that `count` is a valid number of dice for one roll.
pub fn validate_dice_count(count: u32) -> DiceResult<u32> {
    if (MIN_DICE..=MAX_DICE).contains(&count) {
        Ok(count)
    } else {
        Err(DiceError::InvalidArgument(format!(
            "dice count must be between {MIN_DICE} and {MAX_DICE}, got {count}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_count_bounds() {
        assert!(validate_dice_count(1).is_ok());
        assert!(validate_dice_count(6).is_ok());
        assert!(matches!(
            validate_dice_count(0),
            Err(DiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_dice_count(7),
            Err(DiceError::InvalidArgument(_))
        ));
    }
}
