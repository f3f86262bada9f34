//! Speed-to-color mapping
//!
//! Particles are tinted by kinetic "temperature": slow particles keep the
//! cool base color, fast ones blend toward the hot color.

use crate::math::Vec3;
use serde::{Deserialize, Serialize};

/// Cyan `#00f3ff` in normalized sRGB.
pub const COOL: Vec3 = Vec3::new(0.0, 243.0 / 255.0, 1.0);
/// White `#ffffff`.
pub const HOT: Vec3 = Vec3::ONE;
/// Speed multiplier before clamping the blend factor.
pub const HEAT_GAIN: f32 = 3.0;

/// Two-stop linear color ramp driven by particle speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRamp {
    pub cool: Vec3,
    pub hot: Vec3,
    pub gain: f32,
}

impl ColorRamp {
    /// Blend factor for a speed, clamped to `[0, 1]`.
    #[inline]
    pub fn heat(&self, speed: f32) -> f32 {
        let t = speed * self.gain;
        // NaN speeds read as fully hot rather than leaking NaN colors.
        if t.is_nan() {
            return 1.0;
        }
        t.clamp(0.0, 1.0)
    }

    #[inline]
    pub fn color(&self, speed: f32) -> Vec3 {
        self.cool.lerp(self.hot, self.heat(speed))
    }

    #[inline]
    pub fn color_for_velocity(&self, velocity: Vec3) -> Vec3 {
        self.color(velocity.length())
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self {
            cool: COOL,
            hot: HOT,
            gain: HEAT_GAIN,
        }
    }
}
