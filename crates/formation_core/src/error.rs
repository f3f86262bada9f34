use thiserror::Error;

/// Errors raised by formation selection and simulator commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormationError {
    #[error("unknown formation '{name}'")]
    UnknownFormation { name: String },

    #[error("particle count must be greater than zero")]
    ZeroParticles,

    #[error("formation radius must be finite and positive, got {radius}")]
    InvalidRadius { radius: f32 },

    #[error("target field holds {field} points but the simulator has {particles} particles")]
    FieldSizeMismatch { field: usize, particles: usize },

    #[error("invalid simulation config: {reason}")]
    InvalidConfig { reason: String },
}
