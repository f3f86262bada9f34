//! Particle simulator
//!
//! Owns the particle buffers, the active target field and the whole-cloud
//! transform. One call to [`ParticleSimulator::tick`] advances every
//! particle by one semi-implicit Euler step:
//!
//! 1. `a = (target - p) * attraction`, target being the origin in collapse
//! 2. collapse only: swirl `a.x -= p.z * k`, `a.z += p.x * k`
//! 3. per-axis uniform noise of width `noise`
//! 4. `v = (v + a) * damping`
//! 5. `p += v`
//! 6. color from `|v|`
//!
//! The update runs over fixed-size chunks in parallel. Each chunk draws its
//! noise from an RNG seeded by `(seed, tick, chunk)`, so a seeded run
//! produces the same particles on any number of threads.
//!
//! Formation and particle-count changes are applied between ticks. Target
//! fields are swapped whole; particles then travel to the new targets.

use crate::color::ColorRamp;
use crate::config::SimConfig;
use crate::error::FormationError;
use crate::formation::Formation;
use crate::math::{mix_seed, Vec3};
use crate::particles::ParticleBuffers;
use crate::regime::{ForceParams, Regime};
use crate::shape::{self, TargetField};
use crate::signal::ControlInput;
use crate::time::SimulationTime;
use crate::transform::CloudTransform;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Particles per parallel work unit. Also the noise-stream granularity, so
/// changing it changes seeded output.
const CHUNK_SIZE: usize = 2048;

/// Commands applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    SetFormation(Formation),
    SetParticleCount(usize),
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Ticks completed so far, including this one.
    pub tick: u64,
    pub regime: Regime,
}

/// Borrowed, render-ready view of the current state.
///
/// Flat arrays hold three floats per particle.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub positions: &'a [f32],
    pub colors: &'a [f32],
    pub transform: CloudTransform,
    pub aura_positions: &'a [f32],
    pub aura_transform: CloudTransform,
}

impl RenderFrame<'_> {
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Owned copy of a frame, for handing to an out-of-process renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub formation: Formation,
    pub regime: Regime,
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub transform: CloudTransform,
    pub aura_positions: Vec<f32>,
    pub aura_transform: CloudTransform,
}

pub struct ParticleSimulator {
    config: SimConfig,
    particles: ParticleBuffers,
    field: TargetField,
    aura: TargetField,
    transform: CloudTransform,
    regime: Regime,
    time: SimulationTime,
    seed: u64,
    /// Drives randomized formations and newly spawned particles.
    rng: SmallRng,
}

impl ParticleSimulator {
    /// Build a simulator: particles start as a resting big-bang burst and
    /// the target field holds the configured formation.
    pub fn new(config: SimConfig) -> Result<Self, FormationError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = SmallRng::seed_from_u64(mix_seed(seed));

        let particles = ParticleBuffers::burst(
            config.particle_count,
            config.radius,
            config.colors.cool,
            &mut rng,
        );
        let field = shape::generate(
            config.initial_formation,
            config.particle_count,
            config.radius,
            &mut rng,
        );
        let aura = shape::generate(
            Formation::Sphere,
            config.aura_count,
            config.aura_radius,
            &mut rng,
        );

        tracing::info!(
            particles = config.particle_count,
            formation = %config.initial_formation,
            aura = config.aura_count,
            seed,
            "particle simulator ready"
        );

        Ok(Self {
            config,
            particles,
            field,
            aura,
            transform: CloudTransform::IDENTITY,
            regime: Regime::Normal,
            time: SimulationTime::new(),
            seed,
            rng,
        })
    }

    /// Advance the simulation by one tick.
    ///
    /// # Panics
    ///
    /// If the particle arrays and the target field disagree in length.
    pub fn tick(&mut self, input: &ControlInput) -> TickReport {
        self.check_invariants();

        let regime = input.regime();
        let params = self.config.forces.params(regime);
        let ramp = self.config.colors;
        let tick_seed = mix_seed(self.seed ^ mix_seed(self.time.tick_count()));

        let targets = self.field.points();
        let (positions, velocities, colors) = self.particles.split_mut();

        positions
            .par_chunks_mut(CHUNK_SIZE)
            .zip(velocities.par_chunks_mut(CHUNK_SIZE))
            .zip(colors.par_chunks_mut(CHUNK_SIZE))
            .zip(targets.par_chunks(CHUNK_SIZE))
            .enumerate()
            .for_each(|(chunk, (((p, v), c), t))| {
                let mut rng = SmallRng::seed_from_u64(mix_seed(tick_seed ^ chunk as u64));
                integrate(p, v, c, t, regime, &params, &ramp, &mut rng);
            });

        self.transform.update(input, &self.config.transform);
        if regime != self.regime {
            tracing::debug!(?regime, tick = self.time.tick_count(), "regime changed");
        }
        self.regime = regime;
        self.time.advance_tick();

        TickReport {
            tick: self.time.tick_count(),
            regime,
        }
    }

    pub fn apply(&mut self, command: SimCommand) -> Result<(), FormationError> {
        match command {
            SimCommand::SetFormation(formation) => {
                self.set_formation(formation);
                Ok(())
            }
            SimCommand::SetParticleCount(count) => self.set_particle_count(count),
        }
    }

    /// Regenerate the target field. Particle state is left alone.
    pub fn set_formation(&mut self, formation: Formation) {
        self.field = shape::generate(
            formation,
            self.particles.len(),
            self.config.radius,
            &mut self.rng,
        );
        tracing::info!(%formation, particles = self.particles.len(), "formation changed");
    }

    /// Grow or shrink the particle set and regenerate the current formation
    /// at the new size.
    pub fn set_particle_count(&mut self, count: usize) -> Result<(), FormationError> {
        if count == 0 {
            return Err(FormationError::ZeroParticles);
        }
        let previous = self.particles.len();
        self.particles.resize(
            count,
            self.config.radius,
            self.config.colors.cool,
            &mut self.rng,
        );
        self.field = shape::generate(
            self.field.formation(),
            count,
            self.config.radius,
            &mut self.rng,
        );
        self.config.particle_count = count;
        tracing::info!(previous, count, "particle count changed");
        Ok(())
    }

    /// Swap in an externally built field of the same length.
    pub fn replace_field(&mut self, field: TargetField) -> Result<(), FormationError> {
        if field.len() != self.particles.len() {
            return Err(FormationError::FieldSizeMismatch {
                field: field.len(),
                particles: self.particles.len(),
            });
        }
        self.field = field;
        Ok(())
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            positions: self.particles.positions_flat(),
            colors: self.particles.colors_flat(),
            transform: self.transform,
            aura_positions: self.aura.as_flat(),
            aura_transform: self.aura_transform(),
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let frame = self.frame();
        FrameSnapshot {
            tick: self.time.tick_count(),
            formation: self.field.formation(),
            regime: self.regime,
            positions: frame.positions.to_vec(),
            colors: frame.colors.to_vec(),
            transform: frame.transform,
            aura_positions: frame.aura_positions.to_vec(),
            aura_transform: frame.aura_transform,
        }
    }

    /// Mean distance between each particle and its own target point.
    ///
    /// Chunk sums are added in index order, so the result does not depend on
    /// the thread count.
    pub fn mean_target_distance(&self) -> f32 {
        let positions = self.particles.positions();
        if positions.is_empty() {
            return 0.0;
        }
        let chunk_sums: Vec<f64> = positions
            .par_chunks(CHUNK_SIZE)
            .zip(self.field.points().par_chunks(CHUNK_SIZE))
            .map(|(ps, ts)| {
                ps.iter()
                    .zip(ts)
                    .map(|(p, t)| f64::from(p.distance(*t)))
                    .sum::<f64>()
            })
            .collect();
        let total: f64 = chunk_sums.iter().sum();
        (total / positions.len() as f64) as f32
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn formation(&self) -> Formation {
        self.field.formation()
    }

    #[inline]
    pub fn field(&self) -> &TargetField {
        &self.field
    }

    #[inline]
    pub fn particles(&self) -> &ParticleBuffers {
        &self.particles
    }

    #[inline]
    pub fn transform(&self) -> CloudTransform {
        self.transform
    }

    pub fn aura_transform(&self) -> CloudTransform {
        self.transform
            .scaled_rotation(self.config.transform.aura_rotation_factor)
    }

    /// Regime used by the most recent tick.
    #[inline]
    pub fn regime(&self) -> Regime {
        self.regime
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.time.tick_count()
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn check_invariants(&self) {
        let field = self.field.len();
        let lengths = [
            self.particles.positions().len(),
            self.particles.velocities().len(),
            self.particles.colors().len(),
        ];
        if lengths.iter().any(|&len| len != field) {
            tracing::error!(
                field,
                positions = lengths[0],
                velocities = lengths[1],
                colors = lengths[2],
                "particle state out of step with target field"
            );
            panic!(
                "particle state out of step with target field: field {field}, arrays {lengths:?}"
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn integrate(
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    colors: &mut [Vec3],
    targets: &[Vec3],
    regime: Regime,
    params: &ForceParams,
    ramp: &ColorRamp,
    rng: &mut SmallRng,
) {
    let collapse = regime.is_collapse();
    for (((p, v), c), t) in positions
        .iter_mut()
        .zip(velocities.iter_mut())
        .zip(colors.iter_mut())
        .zip(targets)
    {
        let target = if collapse { Vec3::ZERO } else { *t };
        let mut accel = (target - *p) * params.attraction;
        if collapse {
            accel.x -= p.z * params.swirl;
            accel.z += p.x * params.swirl;
        }
        if params.noise > 0.0 {
            accel += Vec3::new(
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
            ) * params.noise;
        }
        *v = (*v + accel) * params.damping;
        *p += *v;
        *c = ramp.color_for_velocity(*v);
    }
}
