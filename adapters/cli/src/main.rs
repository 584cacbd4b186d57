#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Pantheon Siege episodes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pantheon_siege_core::schedule::WaveSchedule;

mod collaborators;
mod episode;
mod schedule_file;

/// Built-in schedule used when no file is provided.
const DEFAULT_SCHEDULE: &str = r#"
defaultIntervalMs = 4000

[[waves]]
name = "skirmish line"

[[waves.spawns]]
type = "skeleton"
side = "right"
count = 2
interval = 1500

[[waves]]
name = "night flyers"

[[waves.spawns]]
type = "bat"
count = 2
interval = 2000
y = 60.0

[[waves.spawns]]
type = "slime"
side = "left"
startOffset = 1000

[[waves]]
name = "last stand"
startDelay = 2500

[[waves.spawns]]
type = "skeleton"
side = "left"
count = 2
interval = 1200

[[waves.spawns]]
type = "bat"
startOffset = 500
"#;

/// Headless episode runner for the Pantheon Siege behavioral core.
#[derive(Debug, Parser)]
#[command(name = "pantheon-siege")]
struct Args {
    /// Wave schedule TOML file; the built-in schedule runs when omitted.
    #[arg(long)]
    schedule: Option<PathBuf>,
    /// Seed for the randomized enemy tunables.
    #[arg(long, default_value_t = 0x70a9_c3d1_5b2e_8f44)]
    seed: u64,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 1_800)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long = "tick-ms", default_value_t = 16)]
    tick_ms: u64,
    /// Print gameplay events as they happen.
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let schedule: WaveSchedule = match &args.schedule {
        Some(path) => schedule_file::load(path)
            .with_context(|| format!("failed to load schedule from {}", path.display()))?,
        None => toml::from_str(DEFAULT_SCHEDULE).context("failed to parse built-in schedule")?,
    };

    let report = episode::run(
        schedule,
        args.seed,
        args.ticks,
        Duration::from_millis(args.tick_ms),
        args.verbose,
    );

    println!("episode finished after {} ticks", report.ticks);
    println!(
        "  waves: {} started, {} completed",
        report.waves_started, report.waves_completed
    );
    println!(
        "  enemies: {} spawned, {} forfeited, {} died",
        report.enemies_spawned, report.spawns_forfeited, report.enemies_died
    );
    println!(
        "  projectiles: {} arrows fired, {} bones launched",
        report.arrows_fired, report.bones_launched
    );
    println!(
        "  player: {} hits taken, health {}/5{}",
        report.player_hits_taken,
        report.final_player_health,
        if report.player_died { ", died" } else { "" }
    );

    Ok(())
}
