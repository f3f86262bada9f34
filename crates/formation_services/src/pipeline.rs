//! Sensor pipeline thread.
//!
//! Polls a [`LandmarkSource`] at its own cadence, interprets each frame and
//! publishes the resulting [`HandSignal`] into a [`Latest`] cell. The
//! simulation never waits on this thread; it reads whatever was published
//! last.
//!
//! A source error is terminal for that source: the pipeline publishes the
//! no-hand signal, logs the failure and exits. The hand then reads as
//! undetected until [`SensorHandle::restart`] installs a new source.

use crate::gesture::GestureInterpreter;
use crate::source::{LandmarkSource, SensorError};
use formation_core::{HandSignal, Latest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub struct SensorPipeline;

impl SensorPipeline {
    /// Start polling `source` every `cadence` on a dedicated thread.
    pub fn spawn(
        source: Box<dyn LandmarkSource>,
        interpreter: GestureInterpreter,
        signal: Latest<HandSignal>,
        cadence: Duration,
    ) -> SensorHandle {
        let mut handle = SensorHandle {
            interpreter,
            signal,
            cadence,
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
        };
        handle.start(source);
        handle
    }
}

/// Owner of a running pipeline. Dropping it stops the thread.
pub struct SensorHandle {
    interpreter: GestureInterpreter,
    signal: Latest<HandSignal>,
    cadence: Duration,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SensorHandle {
    /// Whether the polling thread is still alive. False after a source error.
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    pub fn signal(&self) -> &Latest<HandSignal> {
        &self.signal
    }

    /// Replace the source, stopping the current thread first if it is alive.
    pub fn restart(&mut self, source: Box<dyn LandmarkSource>) {
        self.shutdown();
        info!(source = source.name(), "restarting sensor pipeline");
        self.start(source);
    }

    /// Stop polling and wait for the thread. Leaves the no-hand signal
    /// published.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn start(&mut self, mut source: Box<dyn LandmarkSource>) {
        let stop = Arc::new(AtomicBool::new(false));
        self.stop = Arc::clone(&stop);
        let interpreter = self.interpreter;
        let signal = self.signal.clone();
        let cadence = self.cadence;
        let name = source.name().to_string();

        let spawned = thread::Builder::new()
            .name(format!("sensor-{name}"))
            .spawn(move || {
                info!(source = %name, ?cadence, "sensor pipeline started");
                while !stop.load(Ordering::Acquire) {
                    let started = Instant::now();
                    match source.poll() {
                        Ok(frame) => signal.publish(interpreter.interpret_raw(frame.as_deref())),
                        Err(SensorError::Exhausted) => {
                            info!(source = %name, "sensor source exhausted");
                            signal.publish(HandSignal::ABSENT);
                            return;
                        }
                        Err(err) => {
                            error!(source = %name, "sensor unavailable: {err}");
                            signal.publish(HandSignal::ABSENT);
                            return;
                        }
                    }
                    thread::sleep(cadence.saturating_sub(started.elapsed()));
                }
                debug!(source = %name, "sensor pipeline stopped");
            });

        match spawned {
            Ok(thread) => self.thread = Some(thread),
            Err(err) => {
                error!("failed to spawn sensor thread: {err}");
                self.signal.publish(HandSignal::ABSENT);
                self.thread = None;
            }
        }
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("sensor thread panicked");
            }
        }
        self.signal.publish(HandSignal::ABSENT);
    }
}

impl Drop for SensorHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SyntheticHand;
    use formation_core::math::Vec3;

    const CADENCE: Duration = Duration::from_millis(2);

    struct Failing;

    impl LandmarkSource for Failing {
        fn poll(&mut self) -> Result<Option<Vec<Vec3>>, SensorError> {
            Err(SensorError::Unavailable {
                reason: "camera permission denied".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn wait_for(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn publishes_interpreted_frames() {
        let signal = Latest::new(HandSignal::ABSENT);
        let handle = SensorPipeline::spawn(
            Box::new(SyntheticHand::new(30.0, 4.0)),
            GestureInterpreter::default(),
            signal.clone(),
            CADENCE,
        );
        assert!(wait_for(|| signal.sequence() >= 3));
        assert!(signal.get().is_detected);
        assert!(handle.is_running());

        handle.stop();
        assert!(!signal.get().is_detected);
    }

    #[test]
    fn source_error_reports_no_hand_and_ends() {
        let signal = Latest::new(HandSignal {
            is_detected: true,
            is_clenched: true,
            ..HandSignal::ABSENT
        });
        let handle = SensorPipeline::spawn(
            Box::new(Failing),
            GestureInterpreter::default(),
            signal.clone(),
            CADENCE,
        );
        assert!(wait_for(|| !handle.is_running()));
        assert_eq!(signal.get(), HandSignal::ABSENT);
    }

    #[test]
    fn restart_recovers_after_failure() {
        let signal = Latest::new(HandSignal::ABSENT);
        let mut handle = SensorPipeline::spawn(
            Box::new(Failing),
            GestureInterpreter::default(),
            signal.clone(),
            CADENCE,
        );
        assert!(wait_for(|| !handle.is_running()));

        handle.restart(Box::new(SyntheticHand::new(30.0, 4.0)));
        assert!(wait_for(|| signal.get().is_detected));
        assert!(handle.is_running());
    }
}
