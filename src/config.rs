//! Simulator configuration.
//!
//! Defaults match the reference machine (30-bit words, unknown opcodes
//! ignored, first failure halts the run). A JSON file can override any
//! subset of fields:
//!
//! ```json
//! {
//!   "bit_size": 8,
//!   "unknown_opcodes": "reject",
//!   "on_error": "skip"
//! }
//! ```

use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::binary::{DEFAULT_WIDTH, MAX_WIDTH};

/// What the processor does with an opcode it does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOpcodePolicy {
    /// Treat it as a no-op: PC and TC advance, nothing else changes.
    #[default]
    Ignore,
    /// Fail the step with an unknown-opcode error.
    Reject,
}

/// What the driver does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the run at the first failing instruction.
    #[default]
    Halt,
    /// Log the failure, show the state, and continue with the next line.
    Skip,
}

/// Simulator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Word width used to display values, in bits.
    pub bit_size: u32,

    /// Handling of unrecognized opcodes.
    pub unknown_opcodes: UnknownOpcodePolicy,

    /// Handling of failed instructions during a run.
    pub on_error: ErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bit_size: DEFAULT_WIDTH,
            unknown_opcodes: UnknownOpcodePolicy::default(),
            on_error: ErrorPolicy::default(),
        }
    }
}

impl Config {
    /// Default configuration with a different word width.
    pub fn with_bit_size(bit_size: u32) -> Self {
        Self { bit_size, ..Self::default() }
    }

    /// Check that the configuration describes a buildable machine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_size == 0 || self.bit_size > MAX_WIDTH {
            return Err(ConfigError::InvalidBitSize(self.bit_size));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_json(&source)?;
        tracing::debug!(?config, path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Errors from loading or validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("bit size {0} out of range (1..={max})", max = MAX_WIDTH)]
    InvalidBitSize(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bit_size, 30);
        assert_eq!(config.unknown_opcodes, UnknownOpcodePolicy::Ignore);
        assert_eq!(config.on_error, ErrorPolicy::Halt);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{ "bit_size": 4 }"#).unwrap();
        assert_eq!(config, Config::with_bit_size(4));

        let config = Config::from_json(r#"{ "unknown_opcodes": "reject", "on_error": "skip" }"#).unwrap();
        assert_eq!(config.bit_size, 30);
        assert_eq!(config.unknown_opcodes, UnknownOpcodePolicy::Reject);
        assert_eq!(config.on_error, ErrorPolicy::Skip);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Config::from_json("{ \"bits\": 4 }"), Err(ConfigError::Parse(_))));
        assert!(matches!(Config::from_json("not json"), Err(ConfigError::Parse(_))));
        assert_eq!(
            Config::from_json(r#"{ "bit_size": 0 }"#),
            Err(ConfigError::InvalidBitSize(0))
        );
        assert_eq!(
            Config::from_json(r#"{ "bit_size": 65 }"#),
            Err(ConfigError::InvalidBitSize(65))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/acc-sim.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
