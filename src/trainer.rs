//! Training orchestration: matrix assembly, stratified splitting, boosted
//! tree training, hold-out evaluation and artifact persistence.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{Config, Params};
use crate::dataset::{DatasetBuilder, HeaderDataset};
use crate::error::{Result, SemtokError};
use crate::features::geometry::GEOMETRY_FEATURE_NAMES;
use crate::features::{FEATURE_NAMES, FeatureExtractor};
use crate::features::encoding::EncoderConfig;
use crate::labels::LabelMapper;
use crate::model::gbdt::Gbdt;
use crate::model::{GbdtParams, TrainingStats};

/// Artifact schema version; bump on any layout change.
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Stable artifact filename for the semantic token model.
pub const SEMANTIC_MODEL_FILE: &str = "semantic_classifier.json";

/// Stable artifact filename for the geometry header model.
pub const HEADER_MODEL_FILE: &str = "header_classifier.json";

/// Split/seed options for training runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Fraction of rows held out for validation, stratified by label.
    pub test_fraction: f64,
    /// Seed for the split shuffle, fixed for reproducibility.
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Self-describing persisted model record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    /// The full configured params the model was trained under.
    pub params: Params,
    /// Training timestamp, ISO 8601.
    pub model_time: String,
    /// Feature names in positional order.
    pub feature_names: Vec<String>,
    pub model: Gbdt,
}

/// Per-class tallies on the held-out fold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReport {
    pub label_mapped: i32,
    /// Original-space label, when the conversion map can invert it.
    /// Reporting only; absence never blocks persistence.
    pub label_original: Option<i32>,
    pub support: usize,
    pub correct: usize,
}

/// Hold-out evaluation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub held_out: usize,
    pub accuracy: f64,
    pub per_class: Vec<ClassReport>,
}

/// Outcome of a completed training run.
#[derive(Debug)]
pub struct TrainOutcome {
    pub artifact_path: PathBuf,
    pub evaluation: EvaluationReport,
    pub stats: TrainingStats,
    pub rows: usize,
}

/// Stratified train/test index split: per label, shuffle that label's row
/// indices with the seeded RNG and carve the tail off as the held-out
/// fold, preserving class proportions.
pub fn stratified_split(
    labels: &[i32],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(SemtokError::training(format!(
            "test fraction must be in [0, 1), got {test_fraction}"
        )));
    }

    let mut by_class: Vec<(i32, Vec<usize>)> = Vec::new();
    for (i, &label) in labels.iter().enumerate() {
        match by_class.iter_mut().find(|(l, _)| *l == label) {
            Some((_, indices)) => indices.push(i),
            None => by_class.push((label, vec![i])),
        }
    }
    by_class.sort_by_key(|(label, _)| *label);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut indices) in by_class {
        indices.shuffle(&mut rng);
        let n_test = (indices.len() as f64 * test_fraction).floor() as usize;
        let split = indices.len() - n_test;
        test.extend_from_slice(&indices[split..]);
        train.extend_from_slice(&indices[..split]);
    }

    Ok((train, test))
}

fn gather(matrix: &[Vec<f32>], labels: &[i32], indices: &[usize]) -> (Vec<Vec<f32>>, Vec<i32>) {
    let x = indices.iter().map(|&i| matrix[i].clone()).collect();
    let y = indices.iter().map(|&i| labels[i]).collect();
    (x, y)
}

/// Train a boosted-tree model on a prepared matrix and evaluate it on the
/// held-out fold. Shared by both pipelines.
fn fit_and_evaluate(
    matrix: &[Vec<f32>],
    labels: &[i32],
    n_features: usize,
    params: GbdtParams,
    options: TrainOptions,
    mapper: Option<&LabelMapper>,
) -> Result<(Gbdt, EvaluationReport)> {
    if matrix.is_empty() {
        return Err(SemtokError::training("dataset is empty, nothing to train"));
    }

    if let Some(&bad) = labels.iter().find(|&&l| l < 0) {
        return Err(SemtokError::training(format!(
            "mapped label {bad} is negative; training labels must be compact non-negative indices"
        )));
    }
    let n_classes = labels.iter().copied().max().unwrap_or(0) as usize + 1;

    let (train_idx, test_idx) = stratified_split(labels, options.test_fraction, options.seed)?;
    let (train_x, train_y) = gather(matrix, labels, &train_idx);
    let (test_x, test_y) = gather(matrix, labels, &test_idx);

    log::info!(
        "training on {} rows, validating on {} ({} classes, {} features)",
        train_x.len(),
        test_x.len(),
        n_classes,
        n_features
    );

    let mut model = Gbdt::new(params, n_classes, n_features);
    model.fit(&train_x, &train_y, &test_x, &test_y)?;

    let evaluation = evaluate(&model, &test_x, &test_y, n_classes, mapper);
    Ok((model, evaluation))
}

/// Evaluate a trained model on the held-out fold.
///
/// The original-label column of the report comes from inverting the
/// conversion map; a label the map cannot invert is reported as absent and
/// logged, never escalated.
fn evaluate(
    model: &Gbdt,
    test_x: &[Vec<f32>],
    test_y: &[i32],
    n_classes: usize,
    mapper: Option<&LabelMapper>,
) -> EvaluationReport {
    let mut support = vec![0usize; n_classes];
    let mut correct = vec![0usize; n_classes];
    let mut total_correct = 0usize;

    for (row, &label) in test_x.iter().zip(test_y) {
        let predicted = model.predict(row);
        support[label as usize] += 1;
        if predicted == label {
            correct[label as usize] += 1;
            total_correct += 1;
        }
    }

    let per_class = (0..n_classes as i32)
        .filter(|&class| support[class as usize] > 0)
        .map(|class| {
            let label_original = mapper.and_then(|m| m.invert(class));
            if mapper.is_some() && label_original.is_none() {
                log::warn!("no original label maps to training label {class}; reporting mapped only");
            }
            ClassReport {
                label_mapped: class,
                label_original,
                support: support[class as usize],
                correct: correct[class as usize],
            }
        })
        .collect();

    let accuracy = if test_y.is_empty() {
        0.0
    } else {
        total_correct as f64 / test_y.len() as f64
    };

    EvaluationReport {
        held_out: test_y.len(),
        accuracy,
        per_class,
    }
}

/// Persist a model artifact under `<out_dir>/models/<file_name>`.
///
/// The filename is stable across runs (overwrite semantics); parent
/// directories are created as needed.
pub fn persist_artifact(
    artifact: &ModelArtifact,
    out_dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let models_dir = out_dir.join("models");
    std::fs::create_dir_all(&models_dir)?;

    let path = models_dir.join(file_name);
    let json = serde_json::to_string_pretty(artifact)
        .map_err(|e| SemtokError::persistence(format!("cannot serialize artifact: {e}")))?;
    std::fs::write(&path, json)
        .map_err(|e| SemtokError::persistence(format!("cannot write {}: {e}", path.display())))?;

    log::info!("model generated at {} saved to {}", artifact.model_time, path.display());
    Ok(path)
}

/// Load a persisted artifact back.
pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    let content = std::fs::read_to_string(path)?;
    let artifact: ModelArtifact = serde_json::from_str(&content)?;
    if artifact.schema_version != ARTIFACT_SCHEMA_VERSION {
        return Err(SemtokError::persistence(format!(
            "artifact schema version {} unsupported (expected {})",
            artifact.schema_version, ARTIFACT_SCHEMA_VERSION
        )));
    }
    Ok(artifact)
}

/// End-to-end semantic-token training: corpus → dataset → model →
/// persisted artifact. Training failures abort before anything is written.
pub fn train_semantic_model(
    config: &Config,
    corpus_dir: &Path,
    out_dir: &Path,
    options: TrainOptions,
) -> Result<TrainOutcome> {
    let extractor = FeatureExtractor::new(EncoderConfig::from_params(&config.params));
    let mapper = LabelMapper::build(&config.params.conversion_map)?;

    let dataset = DatasetBuilder::new(&extractor, &mapper).build(corpus_dir)?;
    let gbdt_params = GbdtParams::from_map(&config.params.model_config)?;

    let (model, evaluation) = fit_and_evaluate(
        &dataset.feature_matrix(),
        &dataset.mapped_labels(),
        crate::features::FEATURE_DIM,
        gbdt_params,
        options,
        Some(&mapper),
    )?;

    let stats = model
        .training_stats()
        .cloned()
        .ok_or_else(|| SemtokError::training("model finished without training stats"))?;

    let artifact = ModelArtifact {
        schema_version: ARTIFACT_SCHEMA_VERSION,
        params: config.params.clone(),
        model_time: chrono::Utc::now().to_rfc3339(),
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        model,
    };
    let artifact_path = persist_artifact(&artifact, out_dir, SEMANTIC_MODEL_FILE)?;

    Ok(TrainOutcome {
        artifact_path,
        evaluation,
        stats,
        rows: dataset.len(),
    })
}

/// End-to-end geometry header training, the binary-label variant.
pub fn train_header_model(
    config: &Config,
    corpus_dir: &Path,
    out_dir: &Path,
    options: TrainOptions,
) -> Result<TrainOutcome> {
    let dataset = HeaderDataset::build(corpus_dir)?;
    let gbdt_params = GbdtParams::from_map(&config.params.model_config)?;

    let (model, evaluation) = fit_and_evaluate(
        &dataset.feature_matrix(),
        &dataset.labels(),
        crate::features::geometry::GEOMETRY_FEATURE_DIM,
        gbdt_params,
        options,
        None,
    )?;

    let stats = model
        .training_stats()
        .cloned()
        .ok_or_else(|| SemtokError::training("model finished without training stats"))?;

    let artifact = ModelArtifact {
        schema_version: ARTIFACT_SCHEMA_VERSION,
        params: config.params.clone(),
        model_time: chrono::Utc::now().to_rfc3339(),
        feature_names: GEOMETRY_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        model,
    };
    let artifact_path = persist_artifact(&artifact, out_dir, HEADER_MODEL_FILE)?;

    Ok(TrainOutcome {
        artifact_path,
        evaluation,
        stats,
        rows: dataset.len(),
    })
}
