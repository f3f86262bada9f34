//! Command-line interface for the `formation` binary

use clap::Parser;
use formation_services::SensorKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "formation")]
#[command(about = "Headless gesture-driven particle formation simulator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON settings file. Missing fields take their defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ticks to run before exiting (0 runs until killed)
    #[arg(short, long, default_value_t = 600)]
    pub ticks: u64,

    /// Initial formation (sphere, cube, torus, galaxy, big-bang, ring,
    /// pyramid, helix, glyph:X). Unknown names fall back to big-bang.
    #[arg(short, long)]
    pub formation: Option<String>,

    /// Particle count
    #[arg(short, long)]
    pub particles: Option<usize>,

    /// Fixed RNG seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Switch to the next formation every N ticks
    #[arg(long, value_name = "TICKS")]
    pub cycle_every: Option<u64>,

    /// Landmark source
    #[arg(long)]
    pub sensor: Option<SensorKind>,

    /// JSON-lines landmark recording; implies `--sensor replay`
    #[arg(long, value_name = "PATH")]
    pub replay: Option<PathBuf>,

    /// Hold the manual pointer button (collapses the cloud while no hand is tracked)
    #[arg(long)]
    pub mouse_held: bool,

    /// Write the final frame as JSON
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
