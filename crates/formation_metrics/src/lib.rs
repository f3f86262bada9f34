//! Formation Metrics - tick timing and event counters for the simulation loop
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use formation_metrics::TickTimer;
//!
//! let mut timer = TickTimer::new(120, Duration::from_micros(16_666));
//! timer.begin();
//! sim.tick(&input);
//! timer.end();
//! tracing::info!("tick {:.2} ms", timer.tick_time_ms());
//! ```
//!
//! Without the `metrics` feature every type below is an empty stub.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod phase_profiler;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod tick_timer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use phase_profiler::PhaseProfiler;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use tick_timer::TickTimer;

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Execute code only when metrics are enabled
#[macro_export]
macro_rules! metrics {
    ($($tt:tt)*) => {
        #[cfg(feature = "metrics")]
        {
            $($tt)*
        }
    };
}

/// Time one phase of a tick (zero-cost when metrics disabled)
#[macro_export]
macro_rules! time_phase {
    ($profiler:expr, $name:expr, $body:block) => {{
        #[cfg(feature = "metrics")]
        let result = $profiler.time_phase($name, || $body);
        #[cfg(not(feature = "metrics"))]
        let result = {
            let _ = &$profiler;
            $body
        };
        result
    }};
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct TickTimer;

#[cfg(not(feature = "metrics"))]
impl TickTimer {
    pub fn new(_capacity: usize, _budget: std::time::Duration) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn record(&mut self, _elapsed: std::time::Duration) {}
    pub fn ticks_per_second(&self) -> f64 { 0.0 }
    pub fn tick_time_ms(&self) -> f64 { 0.0 }
    pub fn tick_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
    pub fn overruns(&self) -> u64 { 0 }
    pub fn budget(&self) -> std::time::Duration { std::time::Duration::ZERO }
}

#[cfg(not(feature = "metrics"))]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn average(&self) -> T where T: Default { T::default() }
    pub fn min_max(&self) -> (T, T) where T: Default { (T::default(), T::default()) }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &'static str, _value: u64) {}
    pub fn get(&self, _name: &str) -> u64 { 0 }
    pub fn iter(&self) -> std::iter::Empty<(&'static str, u64)> { std::iter::empty() }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct PhaseProfiler;

#[cfg(not(feature = "metrics"))]
impl PhaseProfiler {
    pub fn new() -> Self { Self }
    pub fn time_phase<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn average(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn reset(&mut self) {}
    pub fn averages(&self) -> std::iter::Empty<(&'static str, std::time::Duration)> { std::iter::empty() }
}

#[cfg(test)]
mod tests {
    #[test]
    fn time_phase_returns_body_value() {
        let mut profiler = super::PhaseProfiler::new();
        let value = crate::time_phase!(profiler, "integrate", { 2 + 2 });
        assert_eq!(value, 4);
    }

    #[test]
    #[cfg(not(feature = "metrics"))]
    fn stubs_compile_without_metrics() {
        let mut timer = super::TickTimer::new(60, std::time::Duration::from_millis(16));
        timer.begin();
        timer.end();
        assert_eq!(timer.overruns(), 0);
        let mut buffer = super::RingBuffer::<f32>::new(10);
        buffer.push(1.0);
        let mut counter = super::Counter::new();
        counter.increment("collapse_ticks", 1);
        assert_eq!(counter.get("collapse_ticks"), 0);
    }
}
