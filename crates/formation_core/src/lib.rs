//! Formation Core
//!
//! Contains the particle simulation itself:
//! - Shape field generation for every formation
//! - Structure-of-arrays particle state and the per-tick integrator
//! - Speed-to-color mapping and the whole-cloud transform
//! - Hand signal types and the latest-value cell that carries them
//! - Deterministic time and math

pub mod color;
pub mod config;
pub mod error;
pub mod formation;
pub mod glyph;
pub mod math;
pub mod particles;
pub mod regime;
pub mod shape;
pub mod signal;
pub mod simulator;
pub mod time;
pub mod transform;

pub use glam;

pub use color::ColorRamp;
pub use config::{SimConfig, TransformConfig};
pub use error::FormationError;
pub use formation::Formation;
pub use regime::{ForceConfig, ForceParams, Regime};
pub use shape::{generate, TargetField};
pub use signal::{ControlInput, HandSignal, Latest, PointerState};
pub use simulator::{FrameSnapshot, ParticleSimulator, RenderFrame, SimCommand, TickReport};
pub use transform::CloudTransform;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
