//! Formation identifiers
//!
//! A formation names the target shape the particle cloud converges toward.
//! Parsing is strict through [`FromStr`]; command and config paths use
//! [`Formation::parse_lenient`], which falls back to [`Formation::BigBang`].

use crate::error::FormationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported target shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Formation {
    /// Even Fibonacci-lattice shell.
    Sphere,
    /// Random fill of a cube.
    Cube,
    /// Ring of major radius `r`, minor radius `0.3r`.
    Torus,
    /// Three-armed flattened spiral.
    Galaxy,
    /// Uniform radial burst. Default and fallback.
    #[default]
    BigBang,
    /// Flat annulus in the XZ plane.
    Ring,
    /// Random fill of a square pyramid.
    Pyramid,
    /// Double helix along Y.
    Helix,
    /// A single uppercase letter or digit sampled from a 5x7 bitmap.
    Glyph(char),
}

/// Order used when cycling through the primary formations.
const CYCLE: [Formation; 5] = [
    Formation::Sphere,
    Formation::Cube,
    Formation::Torus,
    Formation::Galaxy,
    Formation::BigBang,
];

impl Formation {
    /// Parse a formation name, falling back to [`Formation::BigBang`] on
    /// anything unrecognised.
    pub fn parse_lenient(name: &str) -> Self {
        match name.parse() {
            Ok(formation) => formation,
            Err(err) => {
                tracing::warn!("{err}, falling back to {}", Formation::BigBang);
                Formation::BigBang
            }
        }
    }

    /// Whether [`generate`](crate::shape::generate) returns identical output
    /// for identical `(formation, count, radius)`.
    pub fn is_deterministic(&self) -> bool {
        matches!(
            self,
            Formation::Sphere
                | Formation::Torus
                | Formation::Ring
                | Formation::Helix
                | Formation::Glyph(_)
        )
    }

    /// Next primary formation, wrapping around. Extended variants step back
    /// to the start of the cycle.
    pub fn cycle_next(&self) -> Self {
        match CYCLE.iter().position(|f| f == self) {
            Some(idx) => CYCLE[(idx + 1) % CYCLE.len()],
            None => CYCLE[0],
        }
    }

    /// Stable discriminant used when seeding deterministic placements.
    pub(crate) fn stable_id(&self) -> u64 {
        match self {
            Formation::Sphere => 1,
            Formation::Cube => 2,
            Formation::Torus => 3,
            Formation::Galaxy => 4,
            Formation::BigBang => 5,
            Formation::Ring => 6,
            Formation::Pyramid => 7,
            Formation::Helix => 8,
            Formation::Glyph(c) => 0x100 | u64::from(*c),
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formation::Sphere => f.write_str("sphere"),
            Formation::Cube => f.write_str("cube"),
            Formation::Torus => f.write_str("torus"),
            Formation::Galaxy => f.write_str("galaxy"),
            Formation::BigBang => f.write_str("big-bang"),
            Formation::Ring => f.write_str("ring"),
            Formation::Pyramid => f.write_str("pyramid"),
            Formation::Helix => f.write_str("helix"),
            Formation::Glyph(c) => write!(f, "glyph:{c}"),
        }
    }
}

impl FromStr for Formation {
    type Err = FormationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let formation = match lower.as_str() {
            "sphere" => Formation::Sphere,
            "cube" => Formation::Cube,
            "torus" => Formation::Torus,
            "galaxy" => Formation::Galaxy,
            "big-bang" | "bigbang" | "big_bang" | "burst" => Formation::BigBang,
            "ring" => Formation::Ring,
            "pyramid" => Formation::Pyramid,
            "helix" => Formation::Helix,
            _ => {
                let glyph = lower.strip_prefix("glyph:").unwrap_or(&lower);
                let mut chars = glyph.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => {
                        Formation::Glyph(c.to_ascii_uppercase())
                    }
                    _ => {
                        return Err(FormationError::UnknownFormation {
                            name: trimmed.to_string(),
                        })
                    }
                }
            }
        };
        Ok(formation)
    }
}

impl From<String> for Formation {
    fn from(name: String) -> Self {
        Formation::parse_lenient(&name)
    }
}

impl From<Formation> for String {
    fn from(formation: Formation) -> Self {
        formation.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("Sphere".parse(), Ok(Formation::Sphere));
        assert_eq!(" galaxy ".parse(), Ok(Formation::Galaxy));
        assert_eq!("burst".parse(), Ok(Formation::BigBang));
        assert_eq!("glyph:a".parse(), Ok(Formation::Glyph('A')));
        assert_eq!("7".parse(), Ok(Formation::Glyph('7')));
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert_eq!(
            "dodecahedron".parse::<Formation>(),
            Err(FormationError::UnknownFormation {
                name: "dodecahedron".into()
            })
        );
        assert!("glyph:?".parse::<Formation>().is_err());
    }

    #[test]
    fn lenient_parse_falls_back_to_big_bang() {
        assert_eq!(Formation::parse_lenient("nope"), Formation::BigBang);
        assert_eq!(Formation::parse_lenient("torus"), Formation::Torus);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for f in [
            Formation::Sphere,
            Formation::Cube,
            Formation::Torus,
            Formation::Galaxy,
            Formation::BigBang,
            Formation::Ring,
            Formation::Pyramid,
            Formation::Helix,
            Formation::Glyph('Q'),
        ] {
            assert_eq!(f.to_string().parse::<Formation>(), Ok(f));
        }
    }

    #[test]
    fn cycle_wraps() {
        assert_eq!(Formation::Sphere.cycle_next(), Formation::Cube);
        assert_eq!(Formation::BigBang.cycle_next(), Formation::Sphere);
        assert_eq!(Formation::Helix.cycle_next(), Formation::Sphere);
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&Formation::Glyph('Z')).unwrap();
        assert_eq!(json, "\"glyph:Z\"");
        let back: Formation = serde_json::from_str("\"unknown-shape\"").unwrap();
        assert_eq!(back, Formation::BigBang);
    }
}
