#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Duskgrid world.
//!
//! Player moves are read from stdin, one per line: `n`, `e`, `s`, or `w`.
//! A line holding `q` stops the loop after the current frame. Closing stdin
//! does the same unless `--frames` bounds the run.

mod config;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use duskgrid_core::Direction;
use duskgrid_system_simulation::{
    self as simulation, FrameReport, Intent, IntentSender, Sense, Simulation,
};
use duskgrid_world::{WeightedTerrain, World};
use tracing::{debug, info, warn};

use config::FileConfig;

/// Command-line arguments accepted by the Duskgrid binary.
#[derive(Debug, Parser)]
#[command(name = "duskgrid", about = "Runs a headless Duskgrid world")]
struct CliArgs {
    /// TOML file describing the map and its inhabitants.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Stop after this many frames instead of running until `q`.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,
    /// Seed for terrain generation and NPC movement.
    #[arg(long, value_name = "S")]
    seed: Option<u64>,
    /// Milliseconds to wait between frames.
    #[arg(long = "interval-ms", value_name = "MS")]
    interval_ms: Option<u64>,
}

/// Why the input reader stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputEnd {
    /// The player asked to quit.
    Quit,
    /// Stdin reached end of file or failed.
    Closed,
    /// The simulation stopped accepting intents.
    Disconnected,
}

impl InputEnd {
    /// Whether the frame loop should stop. A closed stdin only ends
    /// unbounded runs.
    const fn stops_run(self, bounded: bool) -> bool {
        match self {
            Self::Quit => true,
            Self::Closed => !bounded,
            Self::Disconnected => false,
        }
    }
}

/// Line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlayerInput {
    Move(Direction),
    Quit,
}

fn parse_input(line: &str) -> Option<PlayerInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" | "north" => Some(PlayerInput::Move(Direction::North)),
        "e" | "east" => Some(PlayerInput::Move(Direction::East)),
        "s" | "south" => Some(PlayerInput::Move(Direction::South)),
        "w" | "west" => Some(PlayerInput::Move(Direction::West)),
        "q" | "quit" => Some(PlayerInput::Quit),
        _ => None,
    }
}

/// Entry point for the Duskgrid command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut settings = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(interval_ms) = args.interval_ms {
        settings.frame_interval_ms = interval_ms;
    }

    let mut terrain = WeightedTerrain::new(settings.terrain_table()?, settings.seed)
        .context("failed to build terrain table")?;
    let world = World::new(
        settings.height,
        settings.width,
        &mut terrain,
        &settings.layout(),
    )
    .context("failed to generate world")?;

    let mut simulation = Simulation::new(
        world,
        simulation::Config::new(
            Duration::from_millis(settings.frame_interval_ms),
            settings.seed,
        ),
    );
    let stop = Arc::new(AtomicBool::new(false));
    let _input = spawn_input_reader(
        simulation.intents(),
        Arc::clone(&stop),
        args.frames.is_some(),
    )?;

    let frames = simulation.run(&stop, args.frames, log_frame);
    info!(frames, "duskgrid finished");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn spawn_input_reader(
    intents: IntentSender,
    stop: Arc<AtomicBool>,
    bounded: bool,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-input".to_owned())
        .spawn(move || {
            let end = read_input(io::stdin().lock(), &intents);
            debug!(?end, "stdin reader finished");
            if end.stops_run(bounded) {
                stop.store(true, Ordering::Release);
            }
        })
        .context("failed to spawn stdin reader")
}

/// Forwards moves from `reader` until it quits, closes, or the simulation goes away.
fn read_input<R: BufRead>(reader: R, intents: &IntentSender) -> InputEnd {
    for line in reader.lines() {
        let Ok(line) = line else {
            return InputEnd::Closed;
        };
        match parse_input(&line) {
            Some(PlayerInput::Move(direction)) => {
                if intents.send(Intent::Move(direction)).is_err() {
                    return InputEnd::Disconnected;
                }
            }
            Some(PlayerInput::Quit) => return InputEnd::Quit,
            None => warn!(input = line.trim(), "ignoring unrecognised input"),
        }
    }
    InputEnd::Closed
}

fn log_frame(report: &FrameReport) {
    let nearest = report
        .nearest_light
        .map_or_else(|| "none".to_owned(), |light| light.to_string());
    info!(
        tick = report.tick,
        cycle = ?report.cycle,
        sub_count = report.sub_count,
        player = %report.player,
        facing = %report.facing,
        lumen = report.lumen,
        nearest_light = %nearest,
        light_intensity = report.light_sense.map_or(0.0, Sense::intensity),
        route = report.route.len(),
        "frame"
    );
    for event in &report.moves {
        debug!(?event, "movement");
    }
}
