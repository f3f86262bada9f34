//! Simulation time
//!
//! Fixed 60Hz tick rate. One tick advances every particle exactly once;
//! the physics constants are tuned per tick, not per second.

use std::time::Duration;

/// Default simulation tick rate (60 Hz = 16.666ms per tick)
pub const TICK_RATE_HZ: u32 = 60;

/// Upper bound on ticks run for a single wall-clock frame.
pub const MAX_CATCH_UP_TICKS: u32 = 5;

/// Simulation time tracker. Counts ticks; wall-clock pacing lives in
/// [`FixedStep`].
#[derive(Debug, Clone, Default)]
pub struct SimulationTime {
    tick_count: u64,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
    }
}

/// Duration of one tick at `rate_hz` (clamped to at least 1 Hz).
pub fn tick_duration_for(rate_hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(rate_hz.max(1)))
}

/// Converts wall-clock frame deltas into a whole number of fixed ticks.
///
/// Leftover time carries over to the next frame. When the host stalls, at
/// most [`MAX_CATCH_UP_TICKS`] are reported and the backlog is dropped so a
/// long pause never turns into a burst of hundreds of ticks.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: Duration,
    accumulator: Duration,
}

impl FixedStep {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            step: tick_duration_for(rate_hz),
            accumulator: Duration::ZERO,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Feed an elapsed frame time, returns how many ticks to run now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
            if ticks == MAX_CATCH_UP_TICKS {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ticks
    }

    /// Fraction of the next tick already accumulated, in `[0, 1)`.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }
}
