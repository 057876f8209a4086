//! Boosted-tree model types.
//!
//! The trainer orchestration consumes this module as an opaque
//! fit/predict capability: [`gbdt::Gbdt::fit`] trains on a feature matrix
//! and label vector, [`gbdt::Gbdt::predict_proba`] returns per-class
//! probabilities.

pub mod gbdt;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SemtokError};

/// Hyperparameters for gradient boosting, parsed from the configured
/// `model_config` map. Keys the trainer does not understand are ignored
/// (the full map still travels with the artifact).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GbdtParams {
    /// Shrinkage applied to every tree's contribution.
    pub learning_rate: f64,
    /// Upper bound on boosting rounds.
    pub max_rounds: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Rounds without validation improvement before training stops.
    pub early_stopping_rounds: usize,
}

impl Default for GbdtParams {
    fn default() -> Self {
        GbdtParams {
            learning_rate: 0.1,
            max_rounds: 100,
            max_depth: 6,
            min_samples_split: 20,
            early_stopping_rounds: 10,
        }
    }
}

impl GbdtParams {
    /// Resolve hyperparameters from the opaque config map, falling back to
    /// defaults for absent keys and validating the result.
    pub fn from_map(model_config: &HashMap<String, f64>) -> Result<GbdtParams> {
        let defaults = GbdtParams::default();

        let get_usize = |key: &str, default: usize| -> Result<usize> {
            match model_config.get(key) {
                None => Ok(default),
                Some(&v) if v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
                Some(&v) => Err(SemtokError::config(format!(
                    "model_config.{key} must be a non-negative integer, got {v}"
                ))),
            }
        };

        let params = GbdtParams {
            learning_rate: model_config
                .get("learning_rate")
                .copied()
                .unwrap_or(defaults.learning_rate),
            max_rounds: get_usize("max_rounds", defaults.max_rounds)?,
            max_depth: get_usize("max_depth", defaults.max_depth)?,
            min_samples_split: get_usize("min_samples_split", defaults.min_samples_split)?,
            early_stopping_rounds: get_usize(
                "early_stopping_rounds",
                defaults.early_stopping_rounds,
            )?,
        };

        if params.learning_rate <= 0.0 || params.learning_rate > 1.0 {
            return Err(SemtokError::config(format!(
                "model_config.learning_rate must be in (0, 1], got {}",
                params.learning_rate
            )));
        }
        if params.max_rounds == 0 {
            return Err(SemtokError::config("model_config.max_rounds must be > 0"));
        }
        if params.max_depth == 0 {
            return Err(SemtokError::config("model_config.max_depth must be > 0"));
        }

        Ok(params)
    }
}

/// Per-run training statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Training log-loss per boosting round.
    pub training_losses: Vec<f64>,
    /// Validation log-loss per boosting round.
    pub validation_losses: Vec<f64>,
    /// Boosting rounds actually run.
    pub rounds: usize,
    /// Whether early stopping cut training short.
    pub early_stopped: bool,
    /// Training wall time in milliseconds.
    pub training_time_ms: u64,
}
