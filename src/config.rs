//! Run configuration loaded from a YAML document.
//!
//! The whole document is deserialized into typed structs and validated once
//! at load time; nothing downstream falls back to silent defaults. The
//! layout mirrors the on-disk format: a single top-level `params` section
//! carrying the encoder tables, rule thresholds, label conversion map, and
//! the hyperparameter map handed to the trainer.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SemtokError};

/// An inclusive-exclusive numeric band `[lo, hi]`, written in YAML as a
/// two-element sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl From<(f64, f64)> for Band {
    fn from((lo, hi): (f64, f64)) -> Self {
        Band { lo, hi }
    }
}

impl From<Band> for (f64, f64) {
    fn from(band: Band) -> Self {
        (band.lo, band.hi)
    }
}

/// Threshold bands consumed by the semantic rule cascade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Numeric-composition percentage band.
    pub semantic_range: Band,
    /// Density-encoded mean band.
    pub encode_mean: Band,
    /// Morphological mean band.
    pub morph_mean: Band,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub params: Params,
}

/// The `params` section of the configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Characters treated as numeric: digits plus `.`, `,` and `$`.
    pub char_num: Vec<char>,
    /// Per-character density weights.
    pub density_encoder: HashMap<char, f64>,
    /// Per-character inverse-density weights.
    pub inv_density_encoder: HashMap<char, f64>,
    /// Hyperparameters passed through to the trainer and persisted in the
    /// model artifact.
    #[serde(default)]
    pub model_config: HashMap<String, f64>,
    /// Ordered single-entry records remapping raw labels to training labels.
    #[serde(default)]
    pub conversion_map: Vec<HashMap<i32, i32>>,
    pub semantic_range: Band,
    pub encode_mean: Band,
    pub morph_mean: Band,
}

impl Config {
    /// Load and validate a configuration document from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SemtokError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;

        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Validate the whole document. Called by [`Config::load`]; exposed for
    /// configs assembled in code.
    pub fn validate(&self) -> Result<()> {
        let params = &self.params;

        if params.char_num.is_empty() {
            return Err(SemtokError::config("char_num must not be empty"));
        }
        if params.density_encoder.is_empty() {
            return Err(SemtokError::config("density_encoder must not be empty"));
        }
        if params.inv_density_encoder.is_empty() {
            return Err(SemtokError::config("inv_density_encoder must not be empty"));
        }

        for (name, band) in [
            ("semantic_range", params.semantic_range),
            ("encode_mean", params.encode_mean),
            ("morph_mean", params.morph_mean),
        ] {
            if !band.lo.is_finite() || !band.hi.is_finite() {
                return Err(SemtokError::config(format!("{name} must be finite")));
            }
            if band.lo > band.hi {
                return Err(SemtokError::config(format!(
                    "{name}: lo {} exceeds hi {}",
                    band.lo, band.hi
                )));
            }
        }

        for (i, record) in params.conversion_map.iter().enumerate() {
            if record.len() != 1 {
                return Err(SemtokError::config(format!(
                    "conversion_map entry {i} must contain exactly one mapping, got {}",
                    record.len()
                )));
            }
        }

        for (key, value) in &params.model_config {
            if !value.is_finite() {
                return Err(SemtokError::config(format!(
                    "model_config.{key} must be finite, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Threshold bands for the semantic rule cascade.
    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            semantic_range: self.params.semantic_range,
            encode_mean: self.params.encode_mean,
            morph_mean: self.params.morph_mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
params:
  char_num: ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ',', '$']
  density_encoder:
    a: 0.12
    e: 0.31
  inv_density_encoder:
    a: 0.88
    e: 0.69
  model_config:
    learning_rate: 0.1
    max_rounds: 200
  conversion_map:
    - 0: 0
    - 1: 1
    - 2: 0
  semantic_range: [10.0, 90.0]
  encode_mean: [0.2, 0.8]
  morph_mean: [-0.5, 0.5]
"#
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.params.char_num.len(), 13);
        assert_eq!(config.params.density_encoder[&'a'], 0.12);
        assert_eq!(config.params.conversion_map.len(), 3);
        assert_eq!(config.params.semantic_range.lo, 10.0);
        assert_eq!(config.params.semantic_range.hi, 90.0);
        assert_eq!(config.params.model_config["max_rounds"], 200.0);
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.params.encode_mean = Band { lo: 0.9, hi: 0.1 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multi_entry_conversion_record_rejected() {
        let mut config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
        let mut record = HashMap::new();
        record.insert(3, 1);
        record.insert(4, 2);
        config.params.conversion_map.push(record);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/semtok.yaml").unwrap_err();
        assert!(matches!(err, SemtokError::Config(_)));
    }
}
