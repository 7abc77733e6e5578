//! Relay configuration: detector, telemetry and pinch gating in one document.
//!
//! ```toml
//! pinch_enabled  = true
//! min_confidence = 0.8
//!
//! [detector]
//! threshold = 0.1
//! window    = 30
//!
//! [telemetry]
//! host                   = "127.0.0.1"
//! port                   = 12345
//! max_reconnect_attempts = 3
//! reconnect_delay_ms     = 2000
//! ```
//!
//! Every key is optional; missing keys take the defaults shown.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pinch_gesture::{DetectorConfig, STABLE_CONFIDENCE};
use pinch_telemetry::TelemetryConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Detector(#[from] pinch_gesture::ConfigError),

    #[error("min_confidence must be within [0, 1], got {0}")]
    InvalidConfidence(f32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub detector:  DetectorConfig,
    pub telemetry: TelemetryConfig,
    /// When false, frames are still drawn but no detection runs.
    pub pinch_enabled: bool,
    /// Pinches must be strictly more confident than this to be transmitted.
    pub min_confidence: f32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            detector:       DetectorConfig::default(),
            telemetry:      TelemetryConfig::default(),
            pinch_enabled:  true,
            min_confidence: STABLE_CONFIDENCE,
        }
    }
}

impl RelayConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: RelayConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        RelayConfig::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::InvalidConfidence(self.min_confidence));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
