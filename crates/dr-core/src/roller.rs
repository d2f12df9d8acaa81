//! Uniform die rolling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::die::DieType;
use crate::error::{DiceError, DiceResult};

/// Produces uniformly distributed die values.
///
/// Wraps a [`StdRng`]; seed it for reproducible sequences or draw the seed
/// from the operating system for real play.
#[derive(Debug, Clone)]
pub struct DieRoller {
    rng: StdRng,
}

impl DieRoller {
    /// Create a roller with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a roller seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a roller from an optional seed, falling back to entropy.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Roll a value in `[1, max_value]`.
    ///
    /// Fails with [`DiceError::InvalidArgument`] when `max_value < 1` or it
    /// does not fit a `u32`.
    pub fn roll(&mut self, max_value: i64) -> DiceResult<u32> {
        let max = u32::try_from(max_value)
            .ok()
            .filter(|&m| m >= 1)
            .ok_or_else(|| {
                DiceError::InvalidArgument(format!(
                    "max value must be between 1 and {}, got {max_value}",
                    u32::MAX
                ))
            })?;
        Ok(self.rng.random_range(1..=max))
    }

    /// Roll a single die of the given type.
    pub fn roll_die(&mut self, die: DieType) -> u32 {
        self.rng.random_range(1..=die.sides())
    }

    /// Roll `count` independent dice of the given type.
    pub fn roll_many(&mut self, die: DieType, count: usize) -> Vec<u32> {
        (0..count).map(|_| self.roll_die(die)).collect()
    }
}

impl Default for DieRoller {
    fn default() -> Self {
        Self::from_entropy()
    }
}
