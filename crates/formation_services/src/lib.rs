//! Formation Services Layer
//!
//! Everything between a hand tracker and the simulator: landmark frames,
//! gesture interpretation, landmark sources, the sensor thread and the
//! settings file.

pub mod gesture;
pub mod landmarks;
pub mod pipeline;
pub mod settings;
pub mod source;

pub use gesture::{GestureConfig, GestureInterpreter};
pub use landmarks::{HandLandmarks, LandmarkError};
pub use pipeline::{SensorHandle, SensorPipeline};
pub use settings::{RuntimeSettings, SensorKind, SensorSettings, Settings, SettingsError};
pub use source::{LandmarkSource, ReplaySource, SensorError, SyntheticHand};
