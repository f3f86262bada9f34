//! Whole-cloud orientation and scale.
//!
//! One smoothing stage per tick. Individual particle positions are never
//! touched; renderers apply the transform to the whole buffer.

use crate::config::TransformConfig;
use crate::math::{EulerRot, Quat, Vec2};
use crate::signal::ControlInput;
use serde::{Deserialize, Serialize};

/// Smoothed rotation (Euler X, Y in radians) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudTransform {
    pub rotation: Vec2,
    pub scale: f32,
}

impl CloudTransform {
    pub const IDENTITY: CloudTransform = CloudTransform {
        rotation: Vec2::ZERO,
        scale: 1.0,
    };

    /// Rotation and scale the cloud is easing toward for this input.
    pub fn target(input: &ControlInput, cfg: &TransformConfig) -> CloudTransform {
        let hand = &input.hand;
        if hand.is_detected {
            CloudTransform {
                rotation: Vec2::new(-hand.y, hand.x) * cfg.hand_rotation_gain,
                scale: cfg.scale_base + hand.spread * cfg.scale_span,
            }
        } else {
            let pointer = &input.pointer;
            CloudTransform {
                rotation: Vec2::new(pointer.y, pointer.x) * cfg.pointer_rotation_gain,
                scale: cfg.neutral_scale,
            }
        }
    }

    /// Ease one tick toward the target for `input`.
    pub fn update(&mut self, input: &ControlInput, cfg: &TransformConfig) {
        let target = Self::target(input, cfg);
        self.rotation = self.rotation.lerp(target.rotation, cfg.rotation_lerp);
        self.scale += (target.scale - self.scale) * cfg.scale_lerp;
    }

    /// Same scale, rotation multiplied by `factor`.
    pub fn scaled_rotation(&self, factor: f32) -> CloudTransform {
        CloudTransform {
            rotation: self.rotation * factor,
            scale: self.scale,
        }
    }

    /// Orientation as a quaternion, X applied before Y.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }
}

impl Default for CloudTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{HandSignal, PointerState};

    fn hand(x: f32, y: f32, spread: f32) -> ControlInput {
        ControlInput::new(
            HandSignal {
                x,
                y,
                is_detected: true,
                is_clenched: false,
                spread,
            },
            PointerState::default(),
        )
    }

    #[test]
    fn hand_target_uses_gain_and_spread() {
        let cfg = TransformConfig::default();
        let target = CloudTransform::target(&hand(0.5, 0.2, 1.0), &cfg);
        assert!((target.rotation.x - -0.3).abs() < 1e-6);
        assert!((target.rotation.y - 0.75).abs() < 1e-6);
        assert!((target.scale - 1.5).abs() < 1e-6);

        let fist = CloudTransform::target(&hand(0.0, 0.0, 0.0), &cfg);
        assert!((fist.scale - 0.4).abs() < 1e-6);
    }

    #[test]
    fn no_hand_follows_pointer_at_neutral_scale() {
        let cfg = TransformConfig::default();
        let input = ControlInput::new(
            HandSignal::ABSENT,
            PointerState {
                x: 0.25,
                y: -0.5,
                held: false,
            },
        );
        let target = CloudTransform::target(&input, &cfg);
        assert_eq!(target.rotation, Vec2::new(-0.5, 0.25));
        assert_eq!(target.scale, 1.0);
    }

    #[test]
    fn single_update_moves_by_lerp_factor() {
        let cfg = TransformConfig::default();
        let mut t = CloudTransform::IDENTITY;
        t.update(&hand(0.0, 0.0, 1.0), &cfg);
        // Scale target 1.5, factor 0.05: 1.0 + 0.5 * 0.05.
        assert!((t.scale - 1.025).abs() < 1e-6);
        assert_eq!(t.rotation, Vec2::ZERO);
    }

    #[test]
    fn converges_to_target() {
        let cfg = TransformConfig::default();
        let input = hand(-0.4, 0.6, 0.2);
        let target = CloudTransform::target(&input, &cfg);
        let mut t = CloudTransform::IDENTITY;
        for _ in 0..600 {
            t.update(&input, &cfg);
        }
        assert!(t.rotation.abs_diff_eq(target.rotation, 1e-4));
        assert!((t.scale - target.scale).abs() < 1e-4);
    }

    #[test]
    fn aura_rotation_is_scaled() {
        let t = CloudTransform {
            rotation: Vec2::new(1.0, -2.0),
            scale: 0.7,
        };
        let aura = t.scaled_rotation(0.8);
        assert!(aura.rotation.abs_diff_eq(Vec2::new(0.8, -1.6), 1e-6));
        assert_eq!(aura.scale, 0.7);
    }

    #[test]
    fn identity_quat() {
        assert!(CloudTransform::IDENTITY.quat().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
