//! Engine configuration
//!
//! A small TOML file tunes pacing and edit quantization. Every field has a
//! default, so an absent or partial file behaves like the built-in
//! configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{dispatch, prescription, reveal};

/// Stream reveal pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Delay for steps without a duration hint, in milliseconds
    pub default_step_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig {
            default_step_ms: reveal::DEFAULT_STEP.as_millis() as u64,
        }
    }
}

/// Undo affordance timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Seconds the undo control stays offered after a mutating action
    pub window_secs: u64,
}

impl Default for UndoConfig {
    fn default() -> Self {
        UndoConfig {
            window_secs: dispatch::UNDO_WINDOW.as_secs(),
        }
    }
}

/// Set-edit quantization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Weight edits round to this step, in kg
    pub weight_quantum_kg: f64,
}

impl Default for EditConfig {
    fn default() -> Self {
        EditConfig {
            weight_quantum_kg: prescription::WEIGHT_QUANTUM_KG,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub reveal: RevealConfig,
    pub undo: UndoConfig,
    pub edit: EditConfig,
}

impl CanvasConfig {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<CanvasConfig> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(CanvasConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: CanvasConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config from {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CanvasConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.reveal.default_step_ms, 800);
        assert_eq!(config.undo.window_secs, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("canvas.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[reveal]\ndefault_step_ms = 400").unwrap();

        let config = CanvasConfig::load(&path).unwrap();
        assert_eq!(config.reveal.default_step_ms, 400);
        assert_eq!(config.undo, UndoConfig::default());
        assert_eq!(config.edit, EditConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("canvas.toml");
        std::fs::write(&path, "reveal = \"fast\"").unwrap();
        assert!(CanvasConfig::load(&path).is_err());
    }
}
