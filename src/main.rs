// src/main.rs - CLI entry point for the strategy simulator
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::sync::broadcast;

use robosim::config::{self, SimConfig};
use robosim::sequencer::{RunOutcome, TimingPolicy};
use robosim::simulation::Simulation;
use robosim::strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Frame-paced visual playback, cancellable with ctrl-c
    Live,
    /// Fast-forwarded headless verification
    Instant,
}

#[derive(Debug, Parser)]
#[command(name = "robosim", about = "Scripted 2D robot strategy simulator")]
struct Args {
    /// Strategy script (JSON)
    #[arg(default_value = "strategy.json")]
    strategy: PathBuf,

    /// Execution mode
    #[arg(long, value_enum, default_value_t = Mode::Live)]
    mode: Mode,

    /// Movement speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Simulation config (TOML); built-in defaults when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the trajectory as SVG after the run
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    tracing::info!("Starting robosim");

    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            config::load_config(&path.to_string_lossy())?
        }
        None => SimConfig::default(),
    };

    let script = strategy::load_script(&args.strategy)?;
    tracing::info!(
        groups = script.groups.len(),
        color = ?script.color,
        "strategy loaded from {}",
        args.strategy.display()
    );

    // Ctrl-c cancels a live run at the next tick boundary.
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(());
            }
        });
    }

    let mut simulation = Simulation::new(config, script, args.speed, shutdown_rx)?;
    let policy = match args.mode {
        Mode::Live => TimingPolicy::RealTime,
        Mode::Instant => TimingPolicy::FastForward,
    };

    let outcome = simulation.run(policy).await?;
    let pose = simulation.pose();
    match outcome {
        RunOutcome::Completed => {
            tracing::info!(x = pose.x, y = pose.y, heading = pose.heading, "run complete")
        }
        RunOutcome::Cancelled => {
            tracing::warn!(x = pose.x, y = pose.y, heading = pose.heading, "run cancelled")
        }
    }

    if let Some(path) = &args.output {
        simulation.write_trajectory(path)?;
        tracing::info!("Trajectory written to {}", path.display());
    }

    Ok(())
}
