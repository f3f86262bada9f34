//! Shape field generation.
//!
//! [`generate`] turns a [`Formation`], a particle count and a radius into a
//! [`TargetField`]: one destination point per particle index.
//!
//! Determinism is per formation (see [`Formation::is_deterministic`]):
//!
//! | Formation | Placement | Repeatable |
//! |---|---|---|
//! | Sphere | Fibonacci-style lattice shell at `r` | yes |
//! | Torus | uniform `(u, v)` angles, major `r`, minor `0.3r` | yes (stable seed) |
//! | Ring | annulus at `r` in XZ | yes |
//! | Helix | double helix along Y | yes |
//! | Glyph | 5x7 bitmap, height `2r`; seeded burst without a bitmap | yes |
//! | Cube | uniform fill, edge `1.5r` | no |
//! | Galaxy | three spiral arms, flattened on Y | no |
//! | BigBang | uniform radial burst within `2r` | no |
//! | Pyramid | uniform fill, base edge `1.5r` | no |
//!
//! Randomized formations draw from the caller's RNG. Callers must not
//! expect equality between two calls for them.

use crate::formation::Formation;
use crate::glyph::{self, GLYPH_COLS, GLYPH_ROWS};
use crate::math::{golden_sequence, mix_seed, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};
use std::sync::Arc;

const GALAXY_ARMS: f32 = 3.0;
const TORUS_TUBE: f32 = 0.3;
const CUBE_EDGE: f32 = 1.5;
const BURST_EXTENT: f32 = 2.0;
const HELIX_TURNS: f32 = 4.0;

// R2 low-discrepancy sequence constants (plastic number based).
const R2_A1: f32 = 0.754_877_7;
const R2_A2: f32 = 0.569_840_3;

// ============================================================================
// TargetField
// ============================================================================

/// Immutable per-particle destination points for one formation.
///
/// The points live behind an `Arc`, so handing a field to another owner or
/// swapping it into the simulator is a pointer copy.
#[derive(Debug, Clone)]
pub struct TargetField {
    formation: Formation,
    radius: f32,
    points: Arc<[Vec3]>,
}

impl TargetField {
    pub fn from_points(formation: Formation, radius: f32, points: Vec<Vec3>) -> Self {
        Self {
            formation,
            radius,
            points: points.into(),
        }
    }

    #[inline]
    pub fn formation(&self) -> Formation {
        self.formation
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Flat `[x, y, z, x, y, z, ...]` view.
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Produce `count` target points for `formation` at the given radius.
pub fn generate<R: Rng + ?Sized>(
    formation: Formation,
    count: usize,
    radius: f32,
    rng: &mut R,
) -> TargetField {
    let mut label = formation;
    let points = match formation {
        Formation::Sphere => sphere(count, radius),
        Formation::Cube => cube(count, radius, rng),
        Formation::Torus => {
            let mut stable = SmallRng::seed_from_u64(stable_seed(formation, count, radius));
            torus(count, radius, &mut stable)
        }
        Formation::Galaxy => galaxy(count, radius, rng),
        Formation::BigBang => big_bang(count, radius, rng),
        Formation::Ring => ring(count, radius),
        Formation::Pyramid => pyramid(count, radius, rng),
        Formation::Helix => helix(count, radius),
        Formation::Glyph(c) => match glyph_points(c, count, radius) {
            Some(points) => points,
            None => {
                tracing::warn!("no bitmap for glyph {c:?}, falling back to big-bang");
                // Glyphs repeat, so the fallback burst is seeded from the glyph.
                let mut stable = SmallRng::seed_from_u64(stable_seed(formation, count, radius));
                label = Formation::BigBang;
                big_bang(count, radius, &mut stable)
            }
        },
    };
    debug_assert_eq!(points.len(), count);
    TargetField::from_points(label, radius, points)
}

/// Seed for formations that look random but must repeat exactly.
fn stable_seed(formation: Formation, count: usize, radius: f32) -> u64 {
    mix_seed(
        formation.stable_id()
            ^ (count as u64).rotate_left(17)
            ^ u64::from(radius.to_bits()).rotate_left(41),
    )
}

fn sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let n = count as f32;
    let winding = (n * PI).sqrt();
    (0..count)
        .map(|i| {
            let phi = (-1.0 + (2.0 * i as f32) / n).clamp(-1.0, 1.0).acos();
            let theta = winding * phi;
            Vec3::new(
                radius * theta.cos() * phi.sin(),
                radius * theta.sin() * phi.sin(),
                radius * phi.cos(),
            )
        })
        .collect()
}

fn cube<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    let edge = radius * CUBE_EDGE;
    (0..count)
        .map(|_| {
            Vec3::new(
                (rng.gen::<f32>() - 0.5) * edge,
                (rng.gen::<f32>() - 0.5) * edge,
                (rng.gen::<f32>() - 0.5) * edge,
            )
        })
        .collect()
}

fn torus<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    let tube = radius * TORUS_TUBE;
    (0..count)
        .map(|_| {
            let u = rng.gen::<f32>() * TAU;
            let v = rng.gen::<f32>() * TAU;
            let ring = radius + tube * v.cos();
            Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin())
        })
        .collect()
}

fn galaxy<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    let n = count as f32;
    (0..count)
        .map(|i| {
            let progress = i as f32 / n;
            let spin = progress * GALAXY_ARMS * TAU;
            let r = progress * radius;
            let jitter = (rng.gen::<f32>() - 0.5) * (radius * 0.2);
            Vec3::new(
                r * spin.cos() + jitter,
                (rng.gen::<f32>() - 0.5) * (r * 0.2),
                r * spin.sin() + jitter,
            )
        })
        .collect()
}

fn big_bang<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let r = rng.gen::<f32>() * radius * BURST_EXTENT;
            let theta = rng.gen::<f32>() * TAU;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
            Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
            )
        })
        .collect()
}

fn ring(count: usize, radius: f32) -> Vec<Vec3> {
    let n = count as f32;
    (0..count)
        .map(|i| {
            let angle = i as f32 / n * TAU;
            let band = radius + (golden_sequence(i, 0.0) - 0.5) * radius * 0.1;
            let height = (golden_sequence(i, 0.5) - 0.5) * radius * 0.1;
            Vec3::new(band * angle.cos(), height, band * angle.sin())
        })
        .collect()
}

fn pyramid<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    let half_base = radius * CUBE_EDGE * 0.5;
    let height = radius * CUBE_EDGE;
    (0..count)
        .map(|_| {
            // Cross-section area shrinks with (1 - h)^2, invert its CDF.
            let h = 1.0 - (1.0 - rng.gen::<f32>()).cbrt();
            let half = half_base * (1.0 - h);
            Vec3::new(
                (rng.gen::<f32>() * 2.0 - 1.0) * half,
                -half_base + h * height,
                (rng.gen::<f32>() * 2.0 - 1.0) * half,
            )
        })
        .collect()
}

fn helix(count: usize, radius: f32) -> Vec<Vec3> {
    let coil = radius * 0.5;
    (0..count)
        .map(|i| {
            let strand = (i % 2) as f32 * PI;
            let t = (i / 2) as f32 / (count.div_ceil(2)).max(1) as f32;
            let angle = t * HELIX_TURNS * TAU + strand;
            Vec3::new(coil * angle.cos(), (t * 2.0 - 1.0) * radius, coil * angle.sin())
        })
        .collect()
}

fn glyph_points(c: char, count: usize, radius: f32) -> Option<Vec<Vec3>> {
    let cells = glyph::lit_cells(c);
    if cells.is_empty() {
        return None;
    }
    let cell = 2.0 * radius / GLYPH_ROWS as f32;
    let half_cols = GLYPH_COLS as f32 * 0.5;
    let half_rows = GLYPH_ROWS as f32 * 0.5;
    let points = (0..count)
        .map(|i| {
            let (row, col) = cells[i % cells.len()];
            let k = (i / cells.len()) as f32;
            let u = (0.5 + k * R2_A1).fract();
            let v = (0.5 + k * R2_A2).fract();
            let depth = (golden_sequence(i, 0.5) - 0.5) * radius * 0.2;
            Vec3::new(
                (col as f32 - half_cols + u) * cell,
                (half_rows - row as f32 - 1.0 + v) * cell,
                depth,
            )
        })
        .collect();
    Some(points)
}
