//! Headless Spin Simulator
//!
//! Usage:
//!   rf-reels-sim                          - One random spin on the standard machine
//!   rf-reels-sim --spins 100 --seed 7     - Reproducible batch
//!   rf-reels-sim --targets 0,0,0,0,0      - Directed spin
//!   rf-reels-sim --config slot.yaml --json

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rf_reels::{FrameTicker, GameModeController, SlotConfig, SpinOutcome, SpinRequest};

/// Upper bound on frames a single spin may take before giving up
const MAX_FRAMES_PER_SPIN: u64 = 100_000;

#[derive(Parser)]
#[command(name = "rf-reels-sim", about = "Run reel spins without a renderer")]
struct Cli {
    /// Number of spins to run
    #[arg(short = 'n', long, default_value_t = 1)]
    spins: u32,

    /// Seed for random stops
    #[arg(short, long)]
    seed: Option<u64>,

    /// Machine config (JSON or YAML); the standard machine when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target position per reel, comma separated
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    targets: Option<Vec<f64>>,

    /// Frame rate of the simulated clock
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Print one JSON outcome per line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SlotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlotConfig::standard(),
    };

    let mut controller = GameModeController::from_config(&config)?;
    if let Some(seed) = cli.seed {
        if let Some(orchestrator) = controller.orchestrator_mut() {
            orchestrator.seed(seed);
        }
    }

    let request = match &cli.targets {
        Some(targets) => SpinRequest::directed(targets.clone()),
        None => SpinRequest::random(),
    };

    log::info!("Running {} spin(s) at {} fps", cli.spins, cli.fps);

    let mut ticker = FrameTicker::new(cli.fps);
    let mut total_points = 0u64;

    for _ in 0..cli.spins {
        controller.start_spinning(request.clone())?;

        let Some(frames) =
            ticker.run_until(&mut controller, MAX_FRAMES_PER_SPIN, |c| !c.is_running())
        else {
            bail!("Spin did not settle within {MAX_FRAMES_PER_SPIN} frames");
        };

        let outcome = controller
            .latest_outcome()
            .context("Settled spin produced no outcome")?;
        log::debug!("Spin {} took {} frames", outcome.spin_id, frames);

        total_points += u64::from(outcome.total_points);
        if cli.json {
            println!("{}", serde_json::to_string(outcome.as_ref())?);
        } else {
            print_outcome(&outcome);
        }
    }

    if !cli.json {
        println!("Total: {} points over {} spin(s)", total_points, cli.spins);
    }
    Ok(())
}

fn print_outcome(outcome: &SpinOutcome) {
    println!("Spin {} ({:?})", outcome.spin_id, outcome.mode);
    println!("{}", outcome.grid);

    if !outcome.is_win() {
        println!("  no wins");
    }
    for (line, win) in outcome.line_results.wins() {
        match win.points {
            Some(points) => println!(
                "  line {}: {} x{} = {} points",
                line, win.symbol, win.run_length, points
            ),
            None => println!("  line {}: {} x{} (unpaid)", line, win.symbol, win.run_length),
        }
    }
    println!();
}
