//! Simulation configuration

use crate::color::ColorRamp;
use crate::error::FormationError;
use crate::formation::Formation;
use crate::regime::ForceConfig;
use serde::{Deserialize, Serialize};

/// Default core particle count.
pub const DEFAULT_PARTICLE_COUNT: usize = 75_000;
/// Default aura particle count.
pub const DEFAULT_AURA_COUNT: usize = 4_000;

/// Everything needed to build a [`ParticleSimulator`](crate::ParticleSimulator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub particle_count: usize,
    /// Formation radius in world units.
    pub radius: f32,
    pub initial_formation: Formation,
    /// Static glow shell drawn around the cloud. Zero disables it.
    pub aura_count: usize,
    pub aura_radius: f32,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub forces: ForceConfig,
    pub colors: ColorRamp,
    pub transform: TransformConfig,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), FormationError> {
        if self.particle_count == 0 {
            return Err(FormationError::ZeroParticles);
        }
        for radius in [self.radius, self.aura_radius] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(FormationError::InvalidRadius { radius });
            }
        }
        self.forces
            .normal
            .validate("forces.normal")
            .and_then(|_| self.forces.collapse.validate("forces.collapse"))
            .and_then(|_| self.transform.validate())
            .map_err(|reason| FormationError::InvalidConfig { reason })?;
        if !self.colors.gain.is_finite() || self.colors.gain < 0.0 {
            return Err(FormationError::InvalidConfig {
                reason: "colors.gain must be finite and non-negative".into(),
            });
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            radius: 10.0,
            initial_formation: Formation::Sphere,
            aura_count: DEFAULT_AURA_COUNT,
            aura_radius: 12.0,
            seed: None,
            forces: ForceConfig::default(),
            colors: ColorRamp::default(),
            transform: TransformConfig::default(),
        }
    }
}

/// Whole-cloud rotation and scale smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Radians of rotation per unit of hand pointer offset.
    pub hand_rotation_gain: f32,
    /// Radians of rotation per unit of manual pointer offset.
    pub pointer_rotation_gain: f32,
    pub rotation_lerp: f32,
    pub scale_lerp: f32,
    /// Scale with a closed fist.
    pub scale_base: f32,
    /// Extra scale at full spread.
    pub scale_span: f32,
    /// Scale while no hand is tracked.
    pub neutral_scale: f32,
    /// Aura rotation relative to the main cloud.
    pub aura_rotation_factor: f32,
}

impl TransformConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, t) in [
            ("transform.rotation_lerp", self.rotation_lerp),
            ("transform.scale_lerp", self.scale_lerp),
        ] {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("{name} must be within [0, 1]"));
            }
        }
        Ok(())
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            hand_rotation_gain: 1.5,
            pointer_rotation_gain: 1.0,
            rotation_lerp: 0.1,
            scale_lerp: 0.05,
            scale_base: 0.4,
            scale_span: 1.1,
            neutral_scale: 1.0,
            aura_rotation_factor: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_particles_and_bad_radius() {
        let mut cfg = SimConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(FormationError::ZeroParticles));
        cfg.particle_count = 10;
        cfg.radius = f32::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(FormationError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{ "particle_count": 1200, "initial_formation": "torus" }"#)
                .unwrap();
        assert_eq!(cfg.particle_count, 1200);
        assert_eq!(cfg.initial_formation, Formation::Torus);
        assert_eq!(cfg.radius, 10.0);
        assert_eq!(cfg.forces, ForceConfig::default());
    }
}
