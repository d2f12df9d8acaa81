//! The roll session state machine.
//!
//! A session is either idle or rolling. [`RollSession::start_roll`] moves it
//! to rolling; each [`RollSession::tick`] scrambles the animation frame until
//! the last scheduled tick, which draws the final results, returns the
//! session to idle, and notifies observers exactly once.

use std::fmt;

use dr_core::{CompletedRoll, DiceError, DiceResult, DieRoller, DieType, validate_dice_count};
use serde::Serialize;
use tracing::debug;

use crate::config::RollConfig;

type Observer = Box<dyn FnMut(&CompletedRoll) + Send>;

/// What a call to [`RollSession::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// No roll was in progress; nothing changed.
    Idle,
    /// The animation frame was refreshed. Carries the 1-based tick number.
    Frame(u32),
    /// The roll finished with this result set.
    Completed(CompletedRoll),
}

/// A snapshot of what a host should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    /// Whether a roll is being animated.
    pub is_rolling: bool,
    /// Number of dice currently selected.
    pub dice_count: u32,
    /// Die type currently selected.
    pub die_type: DieType,
    /// One value per die: the animation frame while rolling, otherwise the
    /// final results. Dice with no value yet show 1.
    pub values: Vec<u32>,
    /// Sum of the final results, once a roll has completed and the session
    /// is idle.
    pub total: Option<u32>,
}

/// Transient state of one dice-rolling interaction.
pub struct RollSession {
    roller: DieRoller,
    steps: u32,
    dice_count: u32,
    die_type: DieType,
    animation_frame: Vec<u32>,
    final_results: Vec<u32>,
    is_rolling: bool,
    ticks_done: u32,
    observers: Vec<Observer>,
}

impl fmt::Debug for RollSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollSession")
            .field("dice_count", &self.dice_count)
            .field("die_type", &self.die_type)
            .field("is_rolling", &self.is_rolling)
            .field("ticks_done", &self.ticks_done)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for RollSession {
    fn default() -> Self {
        Self::new(&RollConfig::default())
    }
}

impl RollSession {
    /// Create an idle session from a configuration.
    pub fn new(config: &RollConfig) -> Self {
        let dice_count = config
            .dice_count
            .clamp(dr_core::MIN_DICE, dr_core::MAX_DICE);
        Self {
            roller: DieRoller::new(config.seed),
            steps: config.animation_steps.max(1),
            dice_count,
            die_type: config.die_type,
            animation_frame: vec![1; dice_count as usize],
            final_results: Vec::new(),
            is_rolling: false,
            ticks_done: 0,
            observers: Vec::new(),
        }
    }

    /// Register a callback that runs once for every completed roll.
    ///
    /// Observers run inside [`RollSession::tick`], so they must not call
    /// back into the session.
    pub fn on_roll_completed<F>(&mut self, observer: F)
    where
        F: FnMut(&CompletedRoll) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Number of dice selected.
    pub fn dice_count(&self) -> u32 {
        self.dice_count
    }

    /// Die type selected.
    pub fn die_type(&self) -> DieType {
        self.die_type
    }

    /// Whether a roll is in progress.
    pub fn is_rolling(&self) -> bool {
        self.is_rolling
    }

    /// Current animation frame, one value per die.
    pub fn animation_frame(&self) -> &[u32] {
        &self.animation_frame
    }

    /// Results of the last completed roll; empty before the first one.
    pub fn final_results(&self) -> &[u32] {
        &self.final_results
    }

    /// Number of ticks in one roll.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Ticks still needed before the current roll completes.
    pub fn ticks_remaining(&self) -> u32 {
        if self.is_rolling {
            self.steps - self.ticks_done
        } else {
            0
        }
    }

    /// Change the number of dice. Rejected while rolling.
    pub fn set_dice_count(&mut self, count: u32) -> DiceResult<()> {
        if self.is_rolling {
            return Err(DiceError::RollInProgress);
        }
        self.dice_count = validate_dice_count(count)?;
        self.animation_frame.resize(count as usize, 1);
        Ok(())
    }

    /// Change the die type. Rejected while rolling.
    pub fn set_die_type(&mut self, die: DieType) -> DiceResult<()> {
        if self.is_rolling {
            return Err(DiceError::RollInProgress);
        }
        self.die_type = die;
        Ok(())
    }

    /// Start a roll of `dice_count` dice of type `die`.
    ///
    /// Rejected with [`DiceError::RollInProgress`] while another roll is
    /// animating and with [`DiceError::InvalidArgument`] for a dice count
    /// outside 1-6. A rejected call leaves the session untouched.
    pub fn start_roll(&mut self, dice_count: u32, die: DieType) -> DiceResult<()> {
        if self.is_rolling {
            return Err(DiceError::RollInProgress);
        }
        self.dice_count = validate_dice_count(dice_count)?;
        self.die_type = die;
        self.animation_frame = vec![1; dice_count as usize];
        self.ticks_done = 0;
        self.is_rolling = true;
        debug!(dice = dice_count, die = %die, steps = self.steps, "roll started");
        Ok(())
    }

    /// Start a roll with the currently selected dice.
    pub fn roll(&mut self) -> DiceResult<()> {
        self.start_roll(self.dice_count, self.die_type)
    }

    /// Advance the animation by one tick.
    pub fn tick(&mut self) -> Tick {
        if !self.is_rolling {
            return Tick::Idle;
        }
        self.ticks_done += 1;
        if self.ticks_done < self.steps {
            self.animation_frame = self
                .roller
                .roll_many(self.die_type, self.dice_count as usize);
            return Tick::Frame(self.ticks_done);
        }
        Tick::Completed(self.finish())
    }

    /// Stop the current roll without producing a result.
    ///
    /// Returns `false` if no roll was in progress. Observers are not called
    /// and the previous final results are kept.
    pub fn abort(&mut self) -> bool {
        if !self.is_rolling {
            return false;
        }
        self.is_rolling = false;
        self.ticks_done = 0;
        debug!("roll aborted");
        true
    }

    /// Snapshot of what a host should render right now.
    pub fn display_state(&self) -> DisplayState {
        let source = if self.is_rolling {
            &self.animation_frame
        } else {
            &self.final_results
        };
        let values = (0..self.dice_count as usize)
            .map(|i| source.get(i).copied().unwrap_or(1))
            .collect();
        let total = if self.is_rolling || self.final_results.is_empty() {
            None
        } else {
            Some(self.final_results.iter().sum())
        };
        DisplayState {
            is_rolling: self.is_rolling,
            dice_count: self.dice_count,
            die_type: self.die_type,
            values,
            total,
        }
    }

    fn finish(&mut self) -> CompletedRoll {
        // Independent of the last animation frame.
        self.final_results = self
            .roller
            .roll_many(self.die_type, self.dice_count as usize);
        self.animation_frame = self.final_results.clone();
        self.is_rolling = false;

        let completed = CompletedRoll {
            die: self.die_type,
            results: self.final_results.clone(),
        };
        debug!(
            die = %completed.die,
            results = ?completed.results,
            total = completed.total(),
            "roll completed"
        );
        for observer in &mut self.observers {
            observer(&completed);
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn seeded() -> RollSession {
        RollSession::new(&RollConfig::default().with_seed(42))
    }

    fn drive(session: &mut RollSession) -> CompletedRoll {
        loop {
            if let Tick::Completed(done) = session.tick() {
                return done;
            }
        }
    }

    #[test]
    fn new_session_is_idle() {
        let s = seeded();
        assert!(!s.is_rolling());
        assert_eq!(s.dice_count(), 2);
        assert_eq!(s.die_type(), DieType::D6);
        assert!(s.final_results().is_empty());
        assert_eq!(s.ticks_remaining(), 0);
    }

    #[test]
    fn set_dice_count_resizes_animation_frame() {
        let mut s = RollSession::new(&RollConfig::default().with_seed(1));
        s.set_dice_count(5).unwrap();
        assert_eq!(s.animation_frame().len(), s.dice_count() as usize);
        assert_eq!(s.animation_frame(), &[1, 1, 1, 1, 1]);

        s.roll().unwrap();
        let done = drive(&mut s);
        s.set_dice_count(3).unwrap();
        assert_eq!(s.animation_frame(), &done.results[..3]);
        assert_eq!(s.animation_frame().len(), s.dice_count() as usize);
    }

    #[test]
    fn start_roll_enters_rolling_with_ones() {
        let mut s = seeded();
        s.start_roll(3, DieType::D6).unwrap();
        assert!(s.is_rolling());
        assert_eq!(s.animation_frame(), &[1, 1, 1]);
        assert_eq!(s.ticks_remaining(), 10);
    }

    #[test]
    fn completes_after_configured_steps() {
        let mut s = seeded();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        s.on_roll_completed(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        s.start_roll(3, DieType::D6).unwrap();
        for n in 1..10 {
            assert_eq!(s.tick(), Tick::Frame(n));
            assert!(s.is_rolling());
            assert_eq!(s.animation_frame().len(), 3);
            assert!(s.animation_frame().iter().all(|v| (1..=6).contains(v)));
        }
        let Tick::Completed(done) = s.tick() else {
            panic!("tenth tick should complete the roll");
        };
        assert!(!s.is_rolling());
        assert_eq!(done.results.len(), 3);
        assert!(done.results.iter().all(|v| (1..=6).contains(v)));
        assert_eq!(s.final_results(), done.results.as_slice());
        assert_eq!(s.animation_frame(), done.results.as_slice());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(s.tick(), Tick::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_while_rolling_is_rejected() {
        let mut s = seeded();
        s.start_roll(2, DieType::D20).unwrap();
        s.tick();
        s.tick();
        let frame = s.animation_frame().to_vec();
        let remaining = s.ticks_remaining();

        assert!(matches!(
            s.start_roll(4, DieType::D4),
            Err(DiceError::RollInProgress)
        ));
        assert_eq!(s.animation_frame(), frame.as_slice());
        assert_eq!(s.ticks_remaining(), remaining);
        assert_eq!(s.dice_count(), 2);
        assert_eq!(s.die_type(), DieType::D20);
    }

    #[test]
    fn invalid_dice_count_is_rejected() {
        let mut s = seeded();
        assert!(matches!(
            s.start_roll(0, DieType::D6),
            Err(DiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.start_roll(7, DieType::D6),
            Err(DiceError::InvalidArgument(_))
        ));
        assert!(!s.is_rolling());
        assert_eq!(s.dice_count(), 2);
    }

    #[test]
    fn settings_locked_while_rolling() {
        let mut s = seeded();
        s.set_dice_count(5).unwrap();
        s.set_die_type(DieType::D100).unwrap();
        s.roll().unwrap();
        assert_eq!(s.animation_frame().len(), 5);
        assert!(matches!(s.set_dice_count(1), Err(DiceError::RollInProgress)));
        assert!(matches!(
            s.set_die_type(DieType::D4),
            Err(DiceError::RollInProgress)
        ));
        let done = drive(&mut s);
        assert!(done.results.iter().all(|v| (1..=100).contains(v)));
        assert!(s.set_dice_count(9).is_err());
    }

    #[test]
    fn final_results_stable_until_next_roll() {
        let mut s = seeded();
        s.start_roll(2, DieType::D8).unwrap();
        let first = drive(&mut s);
        s.tick();
        assert_eq!(s.final_results(), first.results.as_slice());

        s.start_roll(2, DieType::D8).unwrap();
        s.tick();
        assert_eq!(s.final_results(), first.results.as_slice());
        let state = s.display_state();
        assert!(state.is_rolling);
        assert_eq!(state.total, None);
    }

    #[test]
    fn abort_keeps_previous_results_and_skips_observers() {
        let mut s = seeded();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        s.on_roll_completed(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        s.start_roll(1, DieType::D12).unwrap();
        let first = drive(&mut s);

        s.start_roll(1, DieType::D12).unwrap();
        s.tick();
        assert!(s.abort());
        assert!(!s.abort());
        assert!(!s.is_rolling());
        assert_eq!(s.final_results(), first.results.as_slice());
        assert_eq!(s.tick(), Tick::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn display_state_pads_and_totals() {
        let mut s = seeded();
        let state = s.display_state();
        assert_eq!(state.values, vec![1, 1]);
        assert_eq!(state.total, None);

        s.start_roll(3, DieType::D6).unwrap();
        let done = drive(&mut s);
        let state = s.display_state();
        assert!(!state.is_rolling);
        assert_eq!(state.values, done.results);
        assert_eq!(state.total, Some(done.total()));

        s.set_dice_count(5).unwrap();
        let state = s.display_state();
        assert_eq!(state.values.len(), 5);
        assert_eq!(&state.values[3..], &[1, 1]);
    }

    #[test]
    fn single_step_completes_on_first_tick() {
        let mut s = RollSession::new(&RollConfig::default().with_seed(1).with_animation_steps(1));
        s.start_roll(2, DieType::D4).unwrap();
        assert!(matches!(s.tick(), Tick::Completed(_)));
    }

    #[test]
    fn seeded_sessions_agree() {
        let mut a = seeded();
        let mut b = seeded();
        a.start_roll(6, DieType::D20).unwrap();
        b.start_roll(6, DieType::D20).unwrap();
        assert_eq!(drive(&mut a), drive(&mut b));
    }
}
