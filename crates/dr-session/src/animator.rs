//! Timer-driven roll animation.
//!
//! [`RollAnimator`] owns a [`RollSession`] behind a mutex and, for each roll,
//! spawns one tokio task that ticks the session on a fixed interval. The task
//! holds a [`CancellationToken`]; cancelling takes the session lock first, and
//! every tick re-checks the token under that same lock, so nothing mutates
//! the session after teardown.
//!
//! Completion observers run on tokio's blocking pool once the final tick has
//! released the session lock, so a slow observer (a history write with an
//! fsync) neither stalls a runtime worker nor blocks the session.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dr_core::{CompletedRoll, DiceResult, DieType};
use tokio::sync::{oneshot, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RollConfig;
use crate::session::{DisplayState, RollSession, Tick};

type Observer = Box<dyn FnMut(&CompletedRoll) + Send>;

/// Resolves when the roll it was issued for finishes.
#[derive(Debug)]
pub struct RollTicket {
    rx: oneshot::Receiver<CompletedRoll>,
}

impl RollTicket {
    /// Wait for the roll. Returns `None` if it was cancelled.
    pub async fn finished(self) -> Option<CompletedRoll> {
        self.rx.await.ok()
    }
}

/// Drives a [`RollSession`] from a tokio interval.
///
/// Must be used from within a tokio runtime.
pub struct RollAnimator {
    session: Arc<Mutex<RollSession>>,
    interval: Duration,
    display: Arc<watch::Sender<DisplayState>>,
    observers: Arc<Mutex<Vec<Observer>>>,
    active: Option<CancellationToken>,
}

impl fmt::Debug for RollAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollAnimator")
            .field("session", &self.session)
            .field("interval", &self.interval)
            .field("observers", &lock(&self.observers).len())
            .field("active", &self.active.is_some())
            .finish()
    }
}

impl RollAnimator {
    /// Create an idle animator.
    pub fn new(config: &RollConfig) -> Self {
        let session = RollSession::new(config);
        let (display, _) = watch::channel(session.display_state());
        Self {
            session: Arc::new(Mutex::new(session)),
            interval: config.tick_interval(),
            display: Arc::new(display),
            observers: Arc::new(Mutex::new(Vec::new())),
            active: None,
        }
    }

    /// Time between two animation ticks.
    pub fn tick_interval(&self) -> Duration {
        self.interval
    }

    /// Register a callback that runs once for every completed roll.
    ///
    /// The callback runs on a blocking thread after the session has gone
    /// idle and its lock has been released. The roll's ticket resolves only
    /// after every callback has returned.
    pub fn on_roll_completed<F>(&self, observer: F)
    where
        F: FnMut(&CompletedRoll) + Send + 'static,
    {
        lock(&self.observers).push(Box::new(observer));
    }

    /// Current display snapshot.
    pub fn display_state(&self) -> DisplayState {
        lock(&self.session).display_state()
    }

    /// Subscribe to the display snapshot published after every change.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    /// Whether a roll is being animated.
    pub fn is_rolling(&self) -> bool {
        lock(&self.session).is_rolling()
    }

    /// Change the number of dice. Rejected while rolling.
    pub fn set_dice_count(&self, count: u32) -> DiceResult<()> {
        let mut session = lock(&self.session);
        session.set_dice_count(count)?;
        self.display.send_replace(session.display_state());
        Ok(())
    }

    /// Change the die type. Rejected while rolling.
    pub fn set_die_type(&self, die: DieType) -> DiceResult<()> {
        let mut session = lock(&self.session);
        session.set_die_type(die)?;
        self.display.send_replace(session.display_state());
        Ok(())
    }

    /// Start an animated roll and return immediately.
    ///
    /// Fails without side effects if a roll is already in progress or the
    /// dice count is out of range.
    pub fn start_roll(&mut self, dice_count: u32, die: DieType) -> DiceResult<RollTicket> {
        {
            let mut session = lock(&self.session);
            session.start_roll(dice_count, die)?;
            self.display.send_replace(session.display_state());
        }

        let token = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(run_ticks(
            Arc::clone(&self.session),
            Arc::clone(&self.display),
            Arc::clone(&self.observers),
            self.interval,
            token.clone(),
            tx,
        ));
        self.active = Some(token);
        Ok(RollTicket { rx })
    }

    /// Start an animated roll with the currently selected dice.
    pub fn roll(&mut self) -> DiceResult<RollTicket> {
        let (count, die) = {
            let session = lock(&self.session);
            (session.dice_count(), session.die_type())
        };
        self.start_roll(count, die)
    }

    /// Cancel the roll in progress, leaving the session idle.
    ///
    /// Returns `false` if nothing was rolling. The pending ticket resolves to
    /// `None` and no observer is called.
    pub fn cancel(&mut self) -> bool {
        let Some(token) = self.active.take() else {
            return false;
        };
        let mut session = lock(&self.session);
        token.cancel();
        let aborted = session.abort();
        if aborted {
            self.display.send_replace(session.display_state());
        }
        aborted
    }
}

impl Drop for RollAnimator {
    fn drop(&mut self) {
        if let Some(token) = self.active.take() {
            let _session = lock(&self.session);
            token.cancel();
        }
    }
}

async fn run_ticks(
    session: Arc<Mutex<RollSession>>,
    display: Arc<watch::Sender<DisplayState>>,
    observers: Arc<Mutex<Vec<Observer>>>,
    period: Duration,
    token: CancellationToken,
    done: oneshot::Sender<CompletedRoll>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("roll animation cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let tick = {
            let mut session = lock(&session);
            if token.is_cancelled() {
                return;
            }
            let tick = session.tick();
            display.send_replace(session.display_state());
            tick
        };

        match tick {
            Tick::Frame(_) => {}
            Tick::Completed(roll) => {
                notify(observers, roll.clone()).await;
                let _ = done.send(roll);
                return;
            }
            Tick::Idle => return,
        }
    }
}

async fn notify(observers: Arc<Mutex<Vec<Observer>>>, roll: CompletedRoll) {
    let calls = tokio::task::spawn_blocking(move || {
        for observer in lock(&observers).iter_mut() {
            observer(&roll);
        }
    });
    if let Err(e) = calls.await {
        warn!(error = %e, "roll completion observer failed");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dr_core::DiceError;
    use dr_history::{HistoryStore, MemoryHistory, record_completed_rolls};

    fn config() -> RollConfig {
        RollConfig::default().with_seed(42)
    }

    fn counter(animator: &RollAnimator) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        animator.on_roll_completed(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        calls
    }

    #[tokio::test(start_paused = true)]
    async fn roll_completes_after_full_duration() {
        let mut animator = RollAnimator::new(&config());
        let calls = counter(&animator);
        let started = tokio::time::Instant::now();

        let ticket = animator.start_roll(3, DieType::D6).unwrap();
        assert!(animator.is_rolling());

        let roll = ticket.finished().await.expect("roll should complete");
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(roll.results.len(), 3);
        assert!(roll.results.iter().all(|v| (1..=6).contains(v)));

        let state = animator.display_state();
        assert!(!state.is_rolling);
        assert_eq!(state.values, roll.results);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_while_rolling() {
        let mut animator = RollAnimator::new(&config());
        let calls = counter(&animator);
        let ticket = animator.start_roll(2, DieType::D6).unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        let before = animator.display_state();
        assert!(matches!(
            animator.start_roll(5, DieType::D20),
            Err(DiceError::RollInProgress)
        ));
        assert_eq!(animator.display_state(), before);

        let started = tokio::time::Instant::now();
        ticket.finished().await.unwrap();
        // The original schedule continues; it is not restarted.
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_count_does_not_start() {
        let mut animator = RollAnimator::new(&config());
        assert!(matches!(
            animator.start_roll(0, DieType::D6),
            Err(DiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            animator.start_roll(7, DieType::D6),
            Err(DiceError::InvalidArgument(_))
        ));
        assert!(!animator.is_rolling());
    }

    #[tokio::test(start_paused = true)]
    async fn watch_sees_every_frame() {
        let mut animator = RollAnimator::new(&config().with_animation_steps(4));
        let mut rx = animator.subscribe();
        let ticket = animator.start_roll(2, DieType::D8).unwrap();

        let mut rolling_frames = 0;
        loop {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            assert_eq!(state.values.len(), 2);
            if !state.is_rolling {
                break;
            }
            rolling_frames += 1;
        }
        assert!(rolling_frames >= 1);
        assert!(ticket.finished().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks_and_completion() {
        let mut animator = RollAnimator::new(&config());
        let calls = counter(&animator);
        let ticket = animator.start_roll(2, DieType::D6).unwrap();

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(animator.cancel());
        assert!(!animator.cancel());
        let after_cancel = animator.display_state();
        assert!(!after_cancel.is_rolling);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(animator.display_state(), after_cancel);
        assert!(ticket.finished().await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // A fresh roll can start after cancellation.
        let ticket = animator.start_roll(1, DieType::D4).unwrap();
        assert!(ticket.finished().await.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_ticks() {
        let animator_config = config();
        let mut animator = RollAnimator::new(&animator_config);
        let calls = counter(&animator);
        let mut rx = animator.subscribe();
        let ticket = animator.start_roll(3, DieType::D12).unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        drop(animator);
        let last = rx.borrow_and_update().clone();
        assert!(last.is_rolling);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*rx.borrow(), last);
        assert!(ticket.finished().await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn observers_run_after_the_session_goes_idle() {
        let mut animator = RollAnimator::new(&config().with_animation_steps(3));
        let rx = animator.subscribe();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        animator.on_roll_completed(move |roll| {
            let state = rx.borrow().clone();
            lock(&log).push((state.is_rolling, state.values, roll.results.clone()));
        });

        let ticket = animator.start_roll(2, DieType::D10).unwrap();
        let roll = ticket.finished().await.unwrap();
        let seen = lock(&seen).clone();
        assert_eq!(seen, vec![(false, roll.results.clone(), roll.results)]);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_roll_is_persisted_and_listed_first() {
        let store = Arc::new(MemoryHistory::new());
        let mut animator = RollAnimator::new(&config());
        animator.on_roll_completed(record_completed_rolls(Arc::clone(&store)));

        let ticket = animator.start_roll(2, DieType::D6).unwrap();
        let roll = ticket.finished().await.unwrap();
        assert_eq!(roll.results.len(), 2);
        assert!(roll.results.iter().all(|v| (1..=6).contains(v)));

        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].results(), roll.results.as_slice());
        assert_eq!(listed[0].die_type(), 6);

        let second = animator.start_roll(4, DieType::D20).unwrap();
        let roll = second.finished().await.unwrap();
        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].results(), roll.results.as_slice());
        assert_eq!(listed[0].die_type(), 20);
    }
}
