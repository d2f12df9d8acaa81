//! CLI frontend for Dice Roll.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use dr_core::DieType;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "diceroll",
    about = "Dice Roll: roll polyhedral dice and keep a history",
    version,
    propagate_version = true
)]
struct Cli {
    /// History file (default: <data dir>/diceroll/history.json)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll dice and save the result to history
    Roll {
        /// Number of dice (1-6)
        #[arg(short = 'n', long, default_value = "2")]
        count: u32,

        /// Die type: d4, d6, d8, d10, d12, d20 or d100
        #[arg(short, long, default_value = "d6")]
        die: DieType,

        /// RNG seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,

        /// Skip the animation and show the result immediately
        #[arg(long)]
        no_animation: bool,

        /// Number of animation ticks
        #[arg(long, default_value = "10")]
        steps: u32,

        /// Total animation length in milliseconds
        #[arg(long, default_value = "1000")]
        duration_ms: u64,
    },

    /// List past rolls, newest first
    History {
        /// Show at most this many rolls
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete one roll by id, id prefix, or #position from `history`
    Delete {
        /// Roll id, its first characters, or #N
        target: String,
    },

    /// Delete every roll in the history
    Clear,

    /// List the supported die types
    Dice,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let history = cli.history.unwrap_or_else(default_history_path);

    let result = match cli.command {
        Commands::Roll {
            count,
            die,
            seed,
            no_animation,
            steps,
            duration_ms,
        } => commands::roll::run(
            &history,
            &commands::roll::RollArgs {
                count,
                die,
                seed,
                animate: !no_animation,
                steps,
                duration_ms,
            },
        ),
        Commands::History { limit } => commands::history::run(&history, limit),
        Commands::Delete { target } => commands::delete::run(&history, &target),
        Commands::Clear => commands::clear::run(&history),
        Commands::Dice => commands::dice::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("diceroll").join("history.json"))
        .unwrap_or_else(|| PathBuf::from("diceroll-history.json"))
}
