use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use dr_core::{CompletedRoll, DieType, validate_dice_count};
use dr_history::{HistoryStore, JsonFileHistory, record_completed_rolls};
use dr_session::{RollAnimator, RollConfig, RollSession, Tick};

use super::{format_values, open_history};

/// Options for a single roll.
pub struct RollArgs {
    pub count: u32,
    pub die: DieType,
    pub seed: Option<u64>,
    pub animate: bool,
    pub steps: u32,
    pub duration_ms: u64,
}

pub fn run(history: &Path, args: &RollArgs) -> Result<(), String> {
    validate_dice_count(args.count).map_err(|e| e.to_string())?;
    let store = Arc::new(open_history(history)?);
    let before = store.len().map_err(|e| e.to_string())?;

    let mut config = RollConfig::default()
        .with_dice_count(args.count)
        .with_die_type(args.die)
        .with_animation_steps(args.steps)
        .with_animation_duration(Duration::from_millis(args.duration_ms));
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let roll = if args.animate {
        roll_animated(&config, Arc::clone(&store), args)?
    } else {
        roll_instant(&config, Arc::clone(&store), args)?
    };

    let notation = format!("{}{}", args.count, args.die);
    println!(
        "  {} {notation}: {}",
        "Rolled".bold(),
        format_values(&roll.results)
    );
    println!("  Total: {}", roll.total().to_string().green().bold());

    let saved = store.len().map_err(|e| e.to_string())?;
    if saved > before {
        println!("  {saved} rolls in history");
    } else {
        println!(
            "  {} this roll was not saved to {}",
            "Note:".yellow().bold(),
            store.path().display()
        );
    }
    Ok(())
}

/// Drive every tick immediately on the current thread.
fn roll_instant(
    config: &RollConfig,
    store: Arc<JsonFileHistory>,
    args: &RollArgs,
) -> Result<CompletedRoll, String> {
    let mut session = RollSession::new(config);
    session.on_roll_completed(record_completed_rolls(store));
    session
        .start_roll(args.count, args.die)
        .map_err(|e| e.to_string())?;
    loop {
        match session.tick() {
            Tick::Completed(roll) => return Ok(roll),
            Tick::Frame(_) => {}
            Tick::Idle => return Err("roll stopped before completing".into()),
        }
    }
}

/// Animate the roll in place, one frame per tick. Ctrl-C cancels it.
fn roll_animated(
    config: &RollConfig,
    store: Arc<JsonFileHistory>,
    args: &RollArgs,
) -> Result<CompletedRoll, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;

    runtime.block_on(async {
        let mut animator = RollAnimator::new(config);
        animator.on_roll_completed(record_completed_rolls(store));
        let mut frames = animator.subscribe();
        let ticket = animator
            .start_roll(args.count, args.die)
            .map_err(|e| e.to_string())?;

        let draw = io::stdout().is_terminal();
        let interrupted = loop {
            tokio::select! {
                changed = frames.changed() => {
                    if changed.is_err() {
                        break false;
                    }
                    let state = frames.borrow_and_update().clone();
                    if !state.is_rolling {
                        break false;
                    }
                    if draw {
                        print!("\r  {}   ", format_values(&state.values).dimmed());
                        let _ = io::stdout().flush();
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    animator.cancel();
                    break true;
                }
            }
        };
        if draw {
            print!("\r\x1b[2K");
        }

        if interrupted {
            return Err("roll cancelled".to_string());
        }
        ticket
            .finished()
            .await
            .ok_or_else(|| "roll cancelled".to_string())
    })
}
