//! Formation Runtime
//!
//! Headless binary: loads settings, starts the sensor pipeline and drives
//! the particle simulator at a fixed tick rate.

mod app;
mod cli;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::Cli;
use formation_core::time::tick_duration_for;
use formation_core::{Formation, HandSignal, Latest, ParticleSimulator, PointerState};
use formation_services::{GestureInterpreter, SensorKind, SensorPipeline, Settings};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the verbosity flag
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Formation v{}", formation_core::VERSION);

    let settings = load_settings(&cli)?;
    run(&cli, settings)
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(name) = &cli.formation {
        settings.simulation.initial_formation = Formation::parse_lenient(name);
    }
    if let Some(count) = cli.particles {
        settings.simulation.particle_count = count;
    }
    if let Some(seed) = cli.seed {
        settings.simulation.seed = Some(seed);
    }
    if let Some(kind) = cli.sensor {
        settings.sensor.kind = kind;
    }
    if let Some(path) = &cli.replay {
        settings.sensor.kind = SensorKind::Replay;
        settings.sensor.replay_path = Some(path.clone());
    }

    settings.validate().context("invalid settings")?;
    Ok(settings)
}

fn run(cli: &Cli, settings: Settings) -> Result<()> {
    let sim = ParticleSimulator::new(settings.simulation.clone())
        .context("creating particle simulator")?;

    let hand = Latest::new(HandSignal::ABSENT);
    // A sensor that cannot start is not fatal: the hand reads as absent.
    let sensor = match settings.sensor.open_source() {
        Ok(Some(source)) => Some(SensorPipeline::spawn(
            source,
            GestureInterpreter::new(settings.gesture),
            hand.clone(),
            settings.sensor.cadence(),
        )),
        Ok(None) => {
            tracing::info!("no sensor configured, hand input disabled");
            None
        }
        Err(err) => {
            tracing::error!("sensor unavailable: {err}");
            None
        }
    };

    let (commands, receiver) = mpsc::channel();
    let tick_duration = tick_duration_for(settings.runtime.tick_rate_hz);
    let pointer = PointerState {
        held: cli.mouse_held,
        ..Default::default()
    };
    let mut app = App::new(
        sim,
        hand,
        pointer,
        receiver,
        settings.runtime.stats_interval_ticks,
        tick_duration,
    )
    .with_formation_cycle(cli.cycle_every.unwrap_or(0));

    tracing::info!(
        ticks = cli.ticks,
        rate_hz = settings.runtime.tick_rate_hz,
        sensor = %settings.sensor.kind,
        formation = %app.sim().formation(),
        cycle_every = cli.cycle_every.unwrap_or(0),
        "running simulation"
    );
    app.run(cli.ticks, settings.runtime.tick_rate_hz);

    if let Some(sensor) = sensor {
        sensor.stop();
    }
    drop(commands);

    if let Some(path) = &cli.snapshot {
        let file = File::create(path)
            .with_context(|| format!("creating snapshot {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &app.sim().snapshot())
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    tracing::info!(
        ticks = app.sim().tick_count(),
        distance = app.sim().mean_target_distance(),
        "simulation finished"
    );
    Ok(())
}
