//! Roll session state machine and animation driver for Dice Roll.
//!
//! [`RollSession`] is a synchronous state machine: start a roll, feed it
//! ticks, and it produces a final result set on the last one.
//! [`RollAnimator`] feeds those ticks from a tokio interval, publishes display
//! snapshots after every tick, and cancels cleanly on teardown.

pub mod animator;
pub mod config;
pub mod session;

pub use animator::{RollAnimator, RollTicket};
pub use config::RollConfig;
pub use session::{DisplayState, RollSession, Tick};
