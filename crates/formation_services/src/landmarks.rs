//! Hand landmark frames
//!
//! A tracked hand is 21 points in image-normalized coordinates: `x` and `y`
//! in `[0, 1]` with `y` growing downward, `z` a relative depth.

use formation_core::math::Vec3;
use thiserror::Error;

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Index, middle, ring and pinky tips. The thumb is not consulted.
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("expected 21 landmarks, got {0}")]
    WrongPointCount(usize),

    #[error("landmark {index} is not finite")]
    NonFinite { index: usize },
}

/// A validated 21-point hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks {
    points: [Vec3; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn from_points(points: &[Vec3]) -> Result<Self, LandmarkError> {
        let points: [Vec3; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongPointCount(points.len()))?;
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self { points })
    }

    #[inline]
    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index]
    }

    #[inline]
    pub fn wrist(&self) -> Vec3 {
        self.points[WRIST]
    }

    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.points
    }

    /// Image-plane distance between two landmarks. Depth is ignored: it is
    /// not on the same scale as `x` and `y`.
    #[inline]
    pub fn planar_distance(&self, a: usize, b: usize) -> f32 {
        self.points[a].truncate().distance(self.points[b].truncate())
    }
}
