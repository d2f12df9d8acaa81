//! Configuration for a roll session.

use std::time::Duration;

use dr_core::DieType;

/// Configuration for a roll session.
#[derive(Debug, Clone)]
pub struct RollConfig {
    /// RNG seed for reproducible rolls. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Number of dice selected when the session starts (1-6).
    pub dice_count: u32,
    /// Die type selected when the session starts.
    pub die_type: DieType,
    /// Total length of the roll animation.
    pub animation_duration: Duration,
    /// Number of ticks the animation is split into. The last tick settles
    /// the final result.
    pub animation_steps: u32,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            seed: None,
            dice_count: 2,
            die_type: DieType::D6,
            animation_duration: Duration::from_secs(1),
            animation_steps: 10,
        }
    }
}

impl RollConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the initial dice count (clamped to 1-6).
    pub fn with_dice_count(mut self, count: u32) -> Self {
        self.dice_count = count.clamp(dr_core::MIN_DICE, dr_core::MAX_DICE);
        self
    }

    /// Set the initial die type.
    pub fn with_die_type(mut self, die: DieType) -> Self {
        self.die_type = die;
        self
    }

    /// Set the total animation duration.
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Set the number of animation ticks (at least 1).
    pub fn with_animation_steps(mut self, steps: u32) -> Self {
        self.animation_steps = steps.max(1);
        self
    }

    /// Time between two animation ticks. Never shorter than a millisecond.
    pub fn tick_interval(&self) -> Duration {
        (self.animation_duration / self.animation_steps.max(1)).max(Duration::from_millis(1))
    }
}
