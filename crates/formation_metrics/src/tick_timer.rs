//! Simulation tick timing

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

/// Rolling timing of simulation ticks against a per-tick budget.
pub struct TickTimer {
    tick_start: Instant,
    tick_times: RingBuffer<Duration>,
    budget: Duration,
    overruns: u64,
}

impl TickTimer {
    pub fn new(capacity: usize, budget: Duration) -> Self {
        Self {
            tick_start: Instant::now(),
            tick_times: RingBuffer::new(capacity),
            budget,
            overruns: 0,
        }
    }

    pub fn begin(&mut self) {
        self.tick_start = Instant::now();
    }

    pub fn end(&mut self) {
        self.record(self.tick_start.elapsed());
    }

    /// Record a tick duration measured elsewhere.
    pub fn record(&mut self, elapsed: Duration) {
        if elapsed > self.budget {
            self.overruns += 1;
        }
        self.tick_times.push(elapsed);
    }

    /// Ticks per second the simulation could sustain at the current average.
    pub fn ticks_per_second(&self) -> f64 {
        let avg = self.tick_times.average();
        if avg.as_secs_f64() > 0.0 {
            1.0 / avg.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn tick_time_ms(&self) -> f64 {
        self.tick_times.average().as_secs_f64() * 1000.0
    }

    pub fn tick_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.tick_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }

    /// Ticks that took longer than the budget since creation.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}
