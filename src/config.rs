//! Configuration loading.
//!
//! TOML file with serde defaults; every field is optional and the defaults
//! reproduce the recorder's stock behavior. Example:
//!
//! ```toml
//! [capture]
//! # Minimum interval between forwarded motion events (~60 per second).
//! motion_throttle_ms = 16
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Default minimum interval between forwarded motion-class events.
pub const DEFAULT_MOTION_THROTTLE_MS: u64 = 16;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Motion-class notifications closer together than this are dropped.
    pub motion_throttle_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            motion_throttle_ms: DEFAULT_MOTION_THROTTLE_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parses a TOML document. Parse errors carry line/column positions.
    pub fn from_toml_str(input: &str) -> Result<Self, Error> {
        Ok(toml::from_str(input)?)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.capture.motion_throttle_ms, 16);
    }

    #[test]
    fn throttle_interval_is_configurable() {
        let config = Config::from_toml_str("[capture]\nmotion_throttle_ms = 8\n").unwrap();
        assert_eq!(config.capture.motion_throttle_ms, 8);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Config::from_toml_str("[capture]\nthrotle_ms = 8\n");
        assert!(result.is_err());
    }

    /// The parse error must point at the offending line.
    #[test]
    fn parse_errors_carry_position() {
        let err = Config::from_toml_str("[capture\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
