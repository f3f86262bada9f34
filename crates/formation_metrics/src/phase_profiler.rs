//! Per-phase timing within a tick (commands, integration, publish, ...)

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy)]
struct PhaseTiming {
    total: Duration,
    calls: u32,
}

#[derive(Default)]
pub struct PhaseProfiler {
    phases: BTreeMap<&'static str, PhaseTiming>,
}

impl PhaseProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_phase<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.record(name, start.elapsed());
        result
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        let timing = self.phases.entry(name).or_default();
        timing.total += elapsed;
        timing.calls += 1;
    }

    /// Mean duration per call of a phase.
    pub fn average(&self, name: &str) -> Duration {
        match self.phases.get(name) {
            Some(t) if t.calls > 0 => t.total / t.calls,
            _ => Duration::ZERO,
        }
    }

    pub fn reset(&mut self) {
        self.phases.clear();
    }

    /// `(name, average)` for every phase, in name order.
    pub fn averages(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.phases.keys().map(|name| (*name, self.average(name)))
    }
}
