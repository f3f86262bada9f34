//! Landmark sources.
//!
//! Anything that can hand over one frame of 21 landmarks (or "no hand") per
//! poll. Real camera trackers live outside this crate; the sources here
//! drive the simulation without hardware.

use crate::landmarks::{INDEX_MCP, LANDMARK_COUNT, MIDDLE_MCP, THUMB_TIP, WRIST};
use formation_core::math::Vec3;
use std::f32::consts::TAU;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad replay frame on line {line}: {source}")]
    Replay {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("replay finished")]
    Exhausted,
}

/// Unified interface for hardware trackers and simulated hands.
pub trait LandmarkSource: Send + 'static {
    /// Next frame. `Ok(None)` means no hand is visible.
    ///
    /// Frames are passed through unvalidated; the interpreter rejects
    /// malformed ones.
    fn poll(&mut self) -> Result<Option<Vec<Vec3>>, SensorError>;

    fn name(&self) -> &str;
}

// ============================================================================
// SyntheticHand
// ============================================================================

/// Procedural front-camera hand.
///
/// The palm drifts on a Lissajous path while the hand opens and closes once
/// per `clench_period`. Time advances by one cadence step per poll, so the
/// sequence is identical on every run.
#[derive(Debug, Clone)]
pub struct SyntheticHand {
    frame: u64,
    frame_secs: f32,
    clench_period: f32,
}

/// Knuckle x offsets from the wrist for index, middle, ring and pinky.
const KNUCKLE_X: [f32; 4] = [-0.045, 0.0, 0.04, 0.075];
const PALM_LENGTH: f32 = 0.16;
const CURLED_REACH: f32 = 0.07;
const EXTENDED_REACH: f32 = 0.35;

impl SyntheticHand {
    pub fn new(cadence_hz: f32, clench_period_secs: f32) -> Self {
        Self {
            frame: 0,
            frame_secs: 1.0 / cadence_hz.max(1.0),
            clench_period: clench_period_secs.max(f32::EPSILON),
        }
    }

    /// Seconds of simulated time at the next poll.
    pub fn elapsed(&self) -> f32 {
        self.frame as f32 * self.frame_secs
    }

    /// Openness in `[0, 1]` at time `t`: open at the start of each period,
    /// closed halfway through.
    pub fn openness(&self, t: f32) -> f32 {
        0.5 + 0.5 * (TAU * t / self.clench_period).cos()
    }

    /// All 21 landmarks at time `t`.
    pub fn landmarks_at(&self, t: f32) -> Vec<Vec3> {
        let center = Vec3::new(
            0.5 + 0.25 * (0.7 * t).sin(),
            0.5 + 0.2 * (1.1 * t + 0.5).sin(),
            0.0,
        );
        let open = self.openness(t);
        let wrist = center + Vec3::new(0.0, PALM_LENGTH * 0.5, 0.0);
        let reach = CURLED_REACH + (EXTENDED_REACH - CURLED_REACH) * open;

        let mut points = vec![Vec3::ZERO; LANDMARK_COUNT];
        points[WRIST] = wrist;

        // Thumb, folding across the palm as the hand closes.
        let thumb_tip = wrist + Vec3::new(-0.04 - 0.1 * open, -0.06 - 0.04 * open, -0.01);
        for k in 1..=THUMB_TIP {
            points[k] = wrist.lerp(thumb_tip, k as f32 / THUMB_TIP as f32);
        }

        for (finger, knuckle_x) in KNUCKLE_X.iter().enumerate() {
            let mcp = wrist + Vec3::new(*knuckle_x, -PALM_LENGTH, 0.0);
            let tip = wrist + Vec3::new(knuckle_x * (1.0 + open), -reach, -0.02);
            let base = INDEX_MCP + finger * 4;
            points[base] = mcp;
            for k in 1..=3 {
                points[base + k] = mcp.lerp(tip, k as f32 / 3.0);
            }
        }
        debug_assert_eq!(points[MIDDLE_MCP].x, center.x);
        points
    }
}

impl LandmarkSource for SyntheticHand {
    fn poll(&mut self) -> Result<Option<Vec<Vec3>>, SensorError> {
        let points = self.landmarks_at(self.elapsed());
        self.frame += 1;
        Ok(Some(points))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

// ============================================================================
// ReplaySource
// ============================================================================

/// Plays back recorded frames from a JSON-lines file.
///
/// One frame per line: `null` for "no hand", otherwise an array of
/// `[x, y, z]` triples. Blank lines are skipped.
pub struct ReplaySource {
    path: PathBuf,
    name: String,
    reader: BufReader<File>,
    looping: bool,
    line: usize,
    frames_since_rewind: usize,
    buf: String,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>, looping: bool) -> Result<Self, SensorError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| SensorError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            name: format!("replay:{}", path.display()),
            path,
            reader: BufReader::new(file),
            looping,
            line: 0,
            frames_since_rewind: 0,
            buf: String::new(),
        })
    }

    fn io_error(&self, source: io::Error) -> SensorError {
        SensorError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn rewind(&mut self) -> Result<(), SensorError> {
        if self.frames_since_rewind == 0 {
            // Nothing but blank lines: looping would spin forever.
            return Err(SensorError::Exhausted);
        }
        self.reader.rewind().map_err(|e| self.io_error(e))?;
        self.line = 0;
        self.frames_since_rewind = 0;
        Ok(())
    }
}

impl LandmarkSource for ReplaySource {
    fn poll(&mut self) -> Result<Option<Vec<Vec3>>, SensorError> {
        loop {
            self.buf.clear();
            let read = match self.reader.read_line(&mut self.buf) {
                Ok(read) => read,
                Err(e) => return Err(self.io_error(e)),
            };
            if read == 0 {
                if !self.looping {
                    return Err(SensorError::Exhausted);
                }
                self.rewind()?;
                continue;
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            let frame: Option<Vec<[f32; 3]>> =
                serde_json::from_str(text).map_err(|source| SensorError::Replay {
                    line: self.line,
                    source,
                })?;
            self.frames_since_rewind += 1;
            return Ok(frame.map(|points| points.into_iter().map(Vec3::from).collect()));
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureInterpreter;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn replay_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn frame_json(points: &[Vec3]) -> String {
        let triples: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
        serde_json::to_string(&triples).unwrap()
    }

    #[test]
    fn synthetic_hand_opens_and_closes() {
        let hand = SyntheticHand::new(30.0, 4.0);
        let interpreter = GestureInterpreter::default();

        let open = interpreter.interpret_raw(Some(&hand.landmarks_at(0.0)));
        assert!(open.is_detected);
        assert!(!open.is_clenched);
        assert!(open.spread > 0.6, "spread {}", open.spread);

        let closed = interpreter.interpret_raw(Some(&hand.landmarks_at(2.0)));
        assert!(closed.is_clenched);
        assert!(closed.spread < 0.2, "spread {}", closed.spread);
    }

    #[test]
    fn synthetic_hand_stays_in_frame() {
        let mut hand = SyntheticHand::new(30.0, 3.0);
        for _ in 0..600 {
            let points = hand.poll().unwrap().unwrap();
            assert_eq!(points.len(), LANDMARK_COUNT);
            for p in points {
                assert!((-0.1..=1.1).contains(&p.x), "{p}");
                assert!((-0.1..=1.1).contains(&p.y), "{p}");
            }
        }
        assert!((hand.elapsed() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn replay_reads_frames_and_gaps() {
        let points = SyntheticHand::new(30.0, 4.0).landmarks_at(0.0);
        let file = replay_file(&format!("{}\nnull\n\n{}\n", frame_json(&points), frame_json(&points)));
        let mut replay = ReplaySource::open(file.path(), false).unwrap();

        let first = replay.poll().unwrap().unwrap();
        assert_eq!(first.len(), LANDMARK_COUNT);
        assert!(first[0].abs_diff_eq(points[0], 1e-6));
        assert!(replay.poll().unwrap().is_none());
        assert!(replay.poll().unwrap().is_some());
        assert!(matches!(replay.poll(), Err(SensorError::Exhausted)));
    }

    #[test]
    fn replay_loops() {
        let file = replay_file("null\n[[0.5, 0.5, 0.0]]\n");
        let mut replay = ReplaySource::open(file.path(), true).unwrap();
        for _ in 0..3 {
            assert!(replay.poll().unwrap().is_none());
            // Wrong point count is passed through; the interpreter rejects it.
            assert_eq!(replay.poll().unwrap().unwrap().len(), 1);
        }
    }

    #[test]
    fn blank_looping_replay_is_exhausted() {
        let file = replay_file("\n\n");
        let mut replay = ReplaySource::open(file.path(), true).unwrap();
        assert!(matches!(replay.poll(), Err(SensorError::Exhausted)));
    }

    #[test]
    fn replay_reports_bad_line() {
        let file = replay_file("null\n{not json}\n");
        let mut replay = ReplaySource::open(file.path(), false).unwrap();
        assert!(replay.poll().unwrap().is_none());
        match replay.poll() {
            Err(SensorError::Replay { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected replay error, got {other:?}"),
        }
    }

    #[test]
    fn missing_replay_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ReplaySource::open(dir.path().join("absent.jsonl"), false);
        assert!(matches!(result, Err(SensorError::Io { .. })));
    }
}
