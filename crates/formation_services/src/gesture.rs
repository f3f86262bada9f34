//! Gesture interpretation: 21 landmarks in, one [`HandSignal`] out.

use crate::landmarks::{HandLandmarks, FINGERTIPS, MIDDLE_MCP, WRIST};
use formation_core::math::Vec3;
use formation_core::HandSignal;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// CONFIG
// ============================================================================

/// Thresholds in image-normalized units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// How far above the wrist a fingertip must be to count as raised.
    pub extension_margin: f32,
    /// How far from the wrist a raised fingertip must be to count as extended.
    pub extension_distance: f32,
    /// Mean wrist-to-tip distance that maps to spread 0.
    pub spread_min: f32,
    /// Mean wrist-to-tip distance that maps to spread 1.
    pub spread_max: f32,
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("extension_margin", self.extension_margin),
            ("extension_distance", self.extension_distance),
            ("spread_min", self.spread_min),
            ("spread_max", self.spread_max),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("gesture.{name} must be finite and non-negative"));
            }
        }
        if self.spread_max <= self.spread_min {
            return Err("gesture.spread_max must exceed gesture.spread_min".into());
        }
        Ok(())
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            extension_margin: 0.1,
            extension_distance: 0.15,
            spread_min: 0.1,
            spread_max: 0.4,
        }
    }
}

// ============================================================================
// INTERPRETER
// ============================================================================

/// Stateless landmark-to-signal mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureInterpreter {
    config: GestureConfig,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Summarize one frame. `None` means no hand was found.
    pub fn interpret(&self, hand: Option<&HandLandmarks>) -> HandSignal {
        let Some(hand) = hand else {
            return HandSignal::ABSENT;
        };
        let (x, y) = pointer(hand);
        HandSignal {
            x,
            y,
            is_detected: true,
            is_clenched: self.is_clenched(hand),
            spread: self.spread(hand),
        }
    }

    /// Like [`interpret`](Self::interpret) for unvalidated input. A malformed
    /// frame reads as "no hand" for this frame.
    pub fn interpret_raw(&self, points: Option<&[Vec3]>) -> HandSignal {
        let Some(points) = points else {
            return HandSignal::ABSENT;
        };
        match HandLandmarks::from_points(points) {
            Ok(hand) => self.interpret(Some(&hand)),
            Err(err) => {
                warn!("dropping landmark frame: {err}");
                HandSignal::ABSENT
            }
        }
    }

    /// Clenched unless some fingertip is both raised above the wrist and far
    /// from it. Occluded or ambiguous hands therefore read as clenched.
    pub fn is_clenched(&self, hand: &HandLandmarks) -> bool {
        let wrist = hand.wrist();
        !FINGERTIPS.iter().any(|&tip| {
            let raised = hand.point(tip).y < wrist.y - self.config.extension_margin;
            raised && hand.planar_distance(WRIST, tip) > self.config.extension_distance
        })
    }

    /// Mean wrist-to-tip distance remapped into `[0, 1]`.
    pub fn spread(&self, hand: &HandLandmarks) -> f32 {
        let mean = FINGERTIPS
            .iter()
            .map(|&tip| hand.planar_distance(WRIST, tip))
            .sum::<f32>()
            / FINGERTIPS.len() as f32;
        let span = self.config.spread_max - self.config.spread_min;
        ((mean - self.config.spread_min) / span).clamp(0.0, 1.0)
    }
}

/// Palm center mapped to control space, X mirrored and Y up-positive.
fn pointer(hand: &HandLandmarks) -> (f32, f32) {
    let palm = (hand.point(WRIST) + hand.point(MIDDLE_MCP)) * 0.5;
    ((0.5 - palm.x) * 2.0, -(palm.y - 0.5) * 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LANDMARK_COUNT, MIDDLE_TIP};

    /// Every point on the wrist, then the given overrides.
    fn hand(overrides: &[(usize, Vec3)]) -> HandLandmarks {
        let mut points = vec![Vec3::new(0.5, 0.8, 0.0); LANDMARK_COUNT];
        for &(index, p) in overrides {
            points[index] = p;
        }
        HandLandmarks::from_points(&points).unwrap()
    }

    fn open_palm() -> HandLandmarks {
        hand(&[
            (8, Vec3::new(0.40, 0.45, 0.0)),
            (12, Vec3::new(0.50, 0.42, 0.0)),
            (16, Vec3::new(0.58, 0.45, 0.0)),
            (20, Vec3::new(0.66, 0.52, 0.0)),
        ])
    }

    #[test]
    fn absent_hand_is_neutral() {
        let interpreter = GestureInterpreter::default();
        assert_eq!(interpreter.interpret(None), HandSignal::ABSENT);
        assert_eq!(interpreter.interpret_raw(None), HandSignal::ABSENT);
    }

    #[test]
    fn curled_fingers_are_clenched() {
        let interpreter = GestureInterpreter::default();
        let fist = hand(&[
            (8, Vec3::new(0.48, 0.74, 0.0)),
            (12, Vec3::new(0.50, 0.73, 0.0)),
            (16, Vec3::new(0.52, 0.74, 0.0)),
            (20, Vec3::new(0.54, 0.76, 0.0)),
        ]);
        let signal = interpreter.interpret(Some(&fist));
        assert!(signal.is_detected);
        assert!(signal.is_clenched);
        assert_eq!(signal.spread, 0.0);
    }

    #[test]
    fn open_palm_is_not_clenched() {
        let interpreter = GestureInterpreter::default();
        let signal = interpreter.interpret(Some(&open_palm()));
        assert!(!signal.is_clenched);
        assert!(signal.spread > 0.5, "spread {}", signal.spread);
    }

    #[test]
    fn one_extended_finger_unclenches() {
        let interpreter = GestureInterpreter::default();
        let pointing = hand(&[(MIDDLE_TIP, Vec3::new(0.5, 0.5, 0.0))]);
        assert!(!interpreter.is_clenched(&pointing));
    }

    #[test]
    fn far_but_lowered_finger_stays_clenched() {
        // Far from the wrist, but below it: not raised.
        let interpreter = GestureInterpreter::default();
        let drooped = hand(&[(MIDDLE_TIP, Vec3::new(0.5, 0.99, 0.0))]);
        assert!(interpreter.is_clenched(&drooped));
        // Raised past the margin but too close to count as extended.
        let short = hand(&[(MIDDLE_TIP, Vec3::new(0.5, 0.68, 0.0))]);
        assert!(interpreter.is_clenched(&short));
    }

    #[test]
    fn pointer_is_mirrored_and_up_positive() {
        let interpreter = GestureInterpreter::default();

        let left_edge = hand(&[
            (WRIST, Vec3::new(0.0, 0.0, 0.0)),
            (MIDDLE_MCP, Vec3::new(0.0, 0.0, 0.0)),
        ]);
        let signal = interpreter.interpret(Some(&left_edge));
        assert_eq!(signal.x, 1.0);
        assert_eq!(signal.y, 1.0);

        let right_edge = hand(&[
            (WRIST, Vec3::new(1.0, 1.0, 0.0)),
            (MIDDLE_MCP, Vec3::new(1.0, 1.0, 0.0)),
        ]);
        let signal = interpreter.interpret(Some(&right_edge));
        assert_eq!(signal.x, -1.0);
        assert_eq!(signal.y, -1.0);

        let centered = hand(&[
            (WRIST, Vec3::new(0.5, 0.7, 0.0)),
            (MIDDLE_MCP, Vec3::new(0.5, 0.3, 0.0)),
        ]);
        let signal = interpreter.interpret(Some(&centered));
        assert!(signal.x.abs() < 1e-6);
        assert!(signal.y.abs() < 1e-6);
    }

    #[test]
    fn spread_clamps_to_unit_range() {
        let interpreter = GestureInterpreter::default();
        let huge = hand(&[
            (8, Vec3::new(0.5, 0.0, 0.0)),
            (12, Vec3::new(0.5, 0.0, 0.0)),
            (16, Vec3::new(0.5, 0.0, 0.0)),
            (20, Vec3::new(0.5, 0.0, 0.0)),
        ]);
        assert_eq!(interpreter.spread(&huge), 1.0);

        // Mean distance 0.25 sits halfway through [0.1, 0.4].
        let half = hand(&[
            (8, Vec3::new(0.5, 0.55, 0.0)),
            (12, Vec3::new(0.5, 0.55, 0.0)),
            (16, Vec3::new(0.5, 0.55, 0.0)),
            (20, Vec3::new(0.5, 0.55, 0.0)),
        ]);
        assert!((interpreter.spread(&half) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn malformed_frames_read_as_absent() {
        let interpreter = GestureInterpreter::default();
        let short = vec![Vec3::splat(0.5); 20];
        assert_eq!(interpreter.interpret_raw(Some(&short)), HandSignal::ABSENT);

        let mut poisoned = vec![Vec3::splat(0.5); LANDMARK_COUNT];
        poisoned[3].x = f32::INFINITY;
        assert_eq!(interpreter.interpret_raw(Some(&poisoned)), HandSignal::ABSENT);

        let points: Vec<Vec3> = open_palm().points().to_vec();
        assert!(interpreter.interpret_raw(Some(&points)).is_detected);
    }

    #[test]
    fn config_rejects_inverted_window() {
        let cfg = GestureConfig {
            spread_min: 0.4,
            spread_max: 0.1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        assert!(GestureConfig::default().validate().is_ok());
    }
}
