//! Settings management

use crate::gesture::GestureConfig;
use crate::source::{LandmarkSource, ReplaySource, SensorError, SyntheticHand};
use formation_core::SimConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Application settings, loaded from a JSON file. Missing sections and
/// fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimConfig,
    pub gesture: GestureConfig,
    pub sensor: SensorSettings,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    #[default]
    Synthetic,
    Replay,
    None,
}

impl FromStr for SensorKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synthetic" | "sim" => Ok(SensorKind::Synthetic),
            "replay" => Ok(SensorKind::Replay),
            "none" | "off" => Ok(SensorKind::None),
            other => Err(SettingsError::Invalid(format!("unknown sensor kind '{other}'"))),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SensorKind::Synthetic => "synthetic",
            SensorKind::Replay => "replay",
            SensorKind::None => "none",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub kind: SensorKind,
    /// Polls per second.
    pub cadence_hz: f32,
    pub replay_path: Option<PathBuf>,
    pub replay_loop: bool,
    /// Open/close cycle length of the synthetic hand.
    pub clench_period_secs: f32,
}

impl SensorSettings {
    pub fn cadence(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.cadence_hz.max(1.0))
    }

    /// Build the configured source. `Ok(None)` when the sensor is disabled.
    pub fn open_source(&self) -> Result<Option<Box<dyn LandmarkSource>>, SensorError> {
        match self.kind {
            SensorKind::None => Ok(None),
            SensorKind::Synthetic => Ok(Some(Box::new(SyntheticHand::new(
                self.cadence_hz,
                self.clench_period_secs,
            )))),
            SensorKind::Replay => {
                let path = self.replay_path.as_ref().ok_or_else(|| SensorError::Unavailable {
                    reason: "replay sensor selected without a replay path".into(),
                })?;
                Ok(Some(Box::new(ReplaySource::open(path, self.replay_loop)?)))
            }
        }
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            kind: SensorKind::Synthetic,
            cadence_hz: 30.0,
            replay_path: None,
            replay_loop: true,
            clench_period_secs: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub tick_rate_hz: u32,
    /// Ticks between stats log lines. Zero disables them.
    pub stats_interval_ticks: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: formation_core::time::TICK_RATE_HZ,
            stats_interval_ticks: 120,
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.simulation
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        self.gesture.validate().map_err(SettingsError::Invalid)?;
        if !self.sensor.cadence_hz.is_finite() || self.sensor.cadence_hz <= 0.0 {
            return Err(SettingsError::Invalid(
                "sensor.cadence_hz must be positive".into(),
            ));
        }
        if !self.sensor.clench_period_secs.is_finite() || self.sensor.clench_period_secs <= 0.0 {
            return Err(SettingsError::Invalid(
                "sensor.clench_period_secs must be positive".into(),
            ));
        }
        if self.sensor.kind == SensorKind::Replay && self.sensor.replay_path.is_none() {
            return Err(SettingsError::Invalid(
                "sensor.replay_path is required for the replay sensor".into(),
            ));
        }
        if self.runtime.tick_rate_hz == 0 {
            return Err(SettingsError::Invalid(
                "runtime.tick_rate_hz must be positive".into(),
            ));
        }
        Ok(())
    }
}
