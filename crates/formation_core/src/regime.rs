//! Force regimes
//!
//! The regime is chosen fresh every tick from the effective clench flag.
//! Nothing carries over between ticks, so there is no hysteresis.

use serde::{Deserialize, Serialize};

/// Which force field drives particles during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Particles spring toward their formation targets.
    #[default]
    Normal,
    /// Every particle falls toward the origin with a horizontal swirl.
    Collapse,
}

impl Regime {
    #[inline]
    pub fn from_clench(clenched: bool) -> Self {
        if clenched {
            Regime::Collapse
        } else {
            Regime::Normal
        }
    }

    #[inline]
    pub fn is_collapse(&self) -> bool {
        matches!(self, Regime::Collapse)
    }
}

/// Per-tick integration constants for one regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceParams {
    /// Fraction of the offset to the target added to velocity each tick.
    pub attraction: f32,
    /// Velocity multiplier applied after all impulses.
    pub damping: f32,
    /// Full width of the uniform per-axis noise impulse.
    pub noise: f32,
    /// Tangential impulse gain in the XZ plane. Zero disables the swirl.
    pub swirl: f32,
}

impl ForceParams {
    pub const NORMAL: ForceParams = ForceParams {
        attraction: 0.03,
        damping: 0.92,
        noise: 0.02,
        swirl: 0.0,
    };

    /// Swirl is a black-hole strength of 0.8 scaled by 0.1.
    pub const COLLAPSE: ForceParams = ForceParams {
        attraction: 0.2,
        damping: 0.85,
        noise: 0.5,
        swirl: 0.08,
    };

    pub(crate) fn validate(&self, name: &str) -> Result<(), String> {
        let fields = [
            ("attraction", self.attraction),
            ("damping", self.damping),
            ("noise", self.noise),
            ("swirl", self.swirl),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name}.{field} must be finite and non-negative"));
            }
        }
        if self.damping > 1.0 {
            return Err(format!("{name}.damping must not exceed 1.0"));
        }
        Ok(())
    }
}

/// Constants for both regimes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub normal: ForceParams,
    pub collapse: ForceParams,
}

impl ForceConfig {
    #[inline]
    pub fn params(&self, regime: Regime) -> ForceParams {
        match regime {
            Regime::Normal => self.normal,
            Regime::Collapse => self.collapse,
        }
    }

    /// Same forces with the noise impulse switched off.
    pub fn without_noise(mut self) -> Self {
        self.normal.noise = 0.0;
        self.collapse.noise = 0.0;
        self
    }
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            normal: ForceParams::NORMAL,
            collapse: ForceParams::COLLAPSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clench_selects_collapse() {
        assert_eq!(Regime::from_clench(true), Regime::Collapse);
        assert_eq!(Regime::from_clench(false), Regime::Normal);
    }

    #[test]
    fn default_constants() {
        let forces = ForceConfig::default();
        let collapse = forces.params(Regime::Collapse);
        assert_eq!(collapse.attraction, 0.2);
        assert_eq!(collapse.damping, 0.85);
        assert_eq!(collapse.noise, 0.5);
        assert_eq!(collapse.swirl, 0.08);
        let normal = forces.params(Regime::Normal);
        assert_eq!(normal.attraction, 0.03);
        assert_eq!(normal.damping, 0.92);
        assert_eq!(normal.noise, 0.02);
        assert_eq!(normal.swirl, 0.0);
    }

    #[test]
    fn rejects_amplifying_damping() {
        let mut params = ForceParams::NORMAL;
        params.damping = 1.2;
        assert!(params.validate("normal").is_err());
        assert!(ForceParams::COLLAPSE.validate("collapse").is_ok());
    }
}
