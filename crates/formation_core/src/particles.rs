//! Structure-of-arrays particle state.
//!
//! Positions, velocities and colors live in three parallel dense arrays
//! indexed `0..len`. Particles are never allocated individually; the arrays
//! only change length on an explicit resize.

use crate::formation::Formation;
use crate::math::Vec3;
use crate::shape;
use rand::Rng;

pub struct ParticleBuffers {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    colors: Vec<Vec3>,
}

impl ParticleBuffers {
    /// Spawn `count` particles in an explosive burst around the origin, at
    /// rest and tinted `color`.
    pub fn burst<R: Rng + ?Sized>(count: usize, radius: f32, color: Vec3, rng: &mut R) -> Self {
        let mut buffers = Self {
            positions: Vec::with_capacity(count),
            velocities: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
        };
        buffers.resize(count, radius, color, rng);
        buffers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Grow or shrink to `count`. Surviving particles keep their state;
    /// new ones join with the burst distribution.
    pub fn resize<R: Rng + ?Sized>(&mut self, count: usize, radius: f32, color: Vec3, rng: &mut R) {
        let current = self.len();
        if count <= current {
            self.positions.truncate(count);
            self.velocities.truncate(count);
            self.colors.truncate(count);
            return;
        }
        let extra = count - current;
        let spawn = shape::generate(Formation::BigBang, extra, radius, rng);
        self.positions.extend_from_slice(spawn.points());
        self.velocities.resize(count, Vec3::ZERO);
        self.colors.resize(count, color);
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Mutable views of all three arrays at once, for the update loop.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut [Vec3], &mut [Vec3], &mut [Vec3]) {
        (&mut self.positions, &mut self.velocities, &mut self.colors)
    }

    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn colors_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }
}
