//! Simulation loop
//!
//! One [`App::step`] is one tick: drain pending commands, read the latest
//! hand signal, advance the simulator, then cycle the formation if the
//! schedule is due. [`App::run`] paces steps against the wall clock.

use formation_core::time::FixedStep;
use formation_core::{
    ControlInput, HandSignal, Latest, ParticleSimulator, PointerState, Regime, SimCommand,
    TickReport,
};
use formation_metrics::{Counter, PhaseProfiler, TickTimer};
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct App {
    sim: ParticleSimulator,
    hand: Latest<HandSignal>,
    pointer: PointerState,
    commands: Receiver<SimCommand>,
    stats_interval: u64,
    cycle_every: Option<u64>,
    timer: TickTimer,
    profiler: PhaseProfiler,
    counter: Counter,
    last_regime: Regime,
}

impl App {
    pub fn new(
        sim: ParticleSimulator,
        hand: Latest<HandSignal>,
        pointer: PointerState,
        commands: Receiver<SimCommand>,
        stats_interval: u64,
        tick_budget: Duration,
    ) -> Self {
        Self {
            sim,
            hand,
            pointer,
            commands,
            stats_interval,
            cycle_every: None,
            timer: TickTimer::new(120, tick_budget),
            profiler: PhaseProfiler::new(),
            counter: Counter::new(),
            last_regime: Regime::Normal,
        }
    }

    /// Switch to the next formation after every `ticks` simulated ticks.
    /// Zero disables cycling.
    pub fn with_formation_cycle(mut self, ticks: u64) -> Self {
        self.cycle_every = (ticks > 0).then_some(ticks);
        self
    }

    pub fn sim(&self) -> &ParticleSimulator {
        &self.sim
    }

    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    /// Run one tick.
    pub fn step(&mut self) -> TickReport {
        self.timer.begin();

        let Self {
            sim,
            commands,
            profiler,
            counter,
            ..
        } = &mut *self;
        formation_metrics::time_phase!(profiler, "commands", {
            drain_commands(sim, commands, counter)
        });
        let input = ControlInput::new(self.hand.get(), self.pointer);
        let sim = &mut self.sim;
        let report = formation_metrics::time_phase!(self.profiler, "integrate", {
            sim.tick(&input)
        });

        if self.cycle_every.is_some_and(|n| report.tick % n == 0) {
            self.cycle_formation();
        }

        self.timer.end();
        self.record(&report, &input);
        if self.stats_interval > 0 && report.tick % self.stats_interval == 0 {
            self.log_stats(&report);
            formation_metrics::metrics! {
                self.profiler.reset();
            }
        }
        report
    }

    /// Step at `rate_hz` until `ticks` have run, or forever when `ticks` is 0.
    pub fn run(&mut self, ticks: u64, rate_hz: u32) {
        let mut pacer = FixedStep::new(rate_hz);
        let mut last = Instant::now();
        let mut done = 0u64;

        while ticks == 0 || done < ticks {
            let now = Instant::now();
            let due = pacer.advance(now - last);
            last = now;

            for _ in 0..due {
                self.step();
                done += 1;
                if ticks != 0 && done >= ticks {
                    return;
                }
            }

            // Sleep until the accumulator reaches the next tick.
            let remaining = pacer.step().mul_f32(1.0 - pacer.alpha());
            thread::sleep(remaining.saturating_sub(last.elapsed()));
        }
    }

    fn cycle_formation(&mut self) {
        let next = self.sim.formation().cycle_next();
        debug!(formation = %next, tick = self.sim.tick_count(), "cycling formation");
        match self.sim.apply(SimCommand::SetFormation(next)) {
            Ok(()) => self.counter.increment("formation_changes", 1),
            Err(err) => warn!(formation = %next, "formation cycle rejected: {err}"),
        }
    }

    fn record(&mut self, report: &TickReport, input: &ControlInput) {
        if report.regime.is_collapse() {
            self.counter.increment("collapse_ticks", 1);
        }
        if report.regime != self.last_regime {
            self.counter.increment("regime_changes", 1);
            self.last_regime = report.regime;
        }
        if input.hand.is_detected {
            self.counter.increment("hand_ticks", 1);
        }
    }

    fn log_stats(&self, report: &TickReport) {
        let hand = self.hand.get();
        info!(
            tick = report.tick,
            regime = ?report.regime,
            formation = %self.sim.formation(),
            particles = self.sim.particle_count(),
            distance = self.sim.mean_target_distance(),
            scale = self.sim.transform().scale,
            hand = hand.is_detected,
            spread = hand.spread,
            "simulation stats"
        );
        formation_metrics::metrics! {
            let (min_ms, max_ms) = self.timer.tick_time_range_ms();
            info!(
                tick_ms = self.timer.tick_time_ms(),
                tps = self.timer.ticks_per_second(),
                min_ms,
                max_ms,
                overruns = self.timer.overruns(),
                budget_ms = self.timer.budget().as_secs_f64() * 1000.0,
                "tick timing"
            );
            for (phase, avg) in self.profiler.averages() {
                debug!(phase, avg_ms = avg.as_secs_f64() * 1000.0, "phase timing");
            }
            for (name, value) in self.counter.iter() {
                debug!(counter = name, value, "event count");
            }
        }
    }
}

/// Apply every queued command. Rejected commands are logged and skipped.
fn drain_commands(
    sim: &mut ParticleSimulator,
    commands: &Receiver<SimCommand>,
    counter: &mut Counter,
) {
    while let Ok(command) = commands.try_recv() {
        if let Err(err) = sim.apply(command) {
            warn!(?command, "command rejected: {err}");
            continue;
        }
        if let SimCommand::SetFormation(_) = command {
            counter.increment("formation_changes", 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formation_core::{Formation, SimConfig};
    use std::sync::mpsc::{self, Sender};

    fn app(count: usize) -> (App, Sender<SimCommand>, Latest<HandSignal>) {
        let sim = ParticleSimulator::new(SimConfig {
            particle_count: count,
            aura_count: 0,
            seed: Some(3),
            ..Default::default()
        })
        .unwrap();
        let hand = Latest::new(HandSignal::ABSENT);
        let (tx, rx) = mpsc::channel();
        let app = App::new(
            sim,
            hand.clone(),
            PointerState::default(),
            rx,
            0,
            Duration::from_millis(16),
        );
        (app, tx, hand)
    }

    #[test]
    fn commands_apply_before_the_tick() {
        let (mut app, tx, _hand) = app(100);
        tx.send(SimCommand::SetFormation(Formation::Galaxy)).unwrap();
        tx.send(SimCommand::SetParticleCount(0)).unwrap();
        tx.send(SimCommand::SetParticleCount(150)).unwrap();

        let report = app.step();
        assert_eq!(report.tick, 1);
        assert_eq!(app.sim().formation(), Formation::Galaxy);
        assert_eq!(app.sim().particle_count(), 150);
    }

    #[test]
    fn latest_hand_signal_drives_regime() {
        let (mut app, _tx, hand) = app(50);
        assert_eq!(app.step().regime, Regime::Normal);

        hand.publish(HandSignal {
            is_detected: true,
            is_clenched: true,
            ..HandSignal::ABSENT
        });
        assert_eq!(app.step().regime, Regime::Collapse);

        hand.publish(HandSignal::ABSENT);
        app.set_pointer(PointerState {
            held: true,
            ..Default::default()
        });
        assert_eq!(app.step().regime, Regime::Collapse);
    }

    #[test]
    fn run_stops_after_requested_ticks() {
        let (mut app, _tx, _hand) = app(20);
        app.run(5, 1000);
        assert_eq!(app.sim().tick_count(), 5);
    }

    #[test]
    fn formation_cycles_every_n_ticks() {
        let (app, _tx, _hand) = app(64);
        let mut app = app.with_formation_cycle(10);
        let mut seen = vec![app.sim().formation()];
        for _ in 0..30 {
            app.step();
            if seen.last() != Some(&app.sim().formation()) {
                seen.push(app.sim().formation());
            }
        }
        assert_eq!(app.sim().tick_count(), 30);
        assert_eq!(
            seen,
            [
                Formation::Sphere,
                Formation::Cube,
                Formation::Torus,
                Formation::Galaxy
            ]
        );
    }

    #[test]
    fn formation_cycle_counts_ticks_in_run() {
        let (app, _tx, _hand) = app(32);
        let mut app = app.with_formation_cycle(3);
        app.run(9, 1000);
        assert_eq!(app.sim().tick_count(), 9);
        assert_eq!(app.sim().formation(), Formation::Galaxy);
    }

    #[test]
    fn zero_cycle_interval_disables_cycling() {
        let (app, _tx, _hand) = app(16);
        let mut app = app.with_formation_cycle(0);
        for _ in 0..5 {
            app.step();
        }
        assert_eq!(app.sim().formation(), Formation::Sphere);
    }
}
