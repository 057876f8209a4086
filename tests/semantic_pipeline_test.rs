use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use semtok::cli::args::SemtokArgs;
use semtok::cli::commands::execute_command;
use semtok::config::Config;
use semtok::dataset::DatasetRow;
use semtok::error::Result;
use semtok::trainer::{self, SEMANTIC_MODEL_FILE, TrainOptions, load_artifact};

use clap::Parser;

/// Write a complete YAML config into `dir` and return its path.
fn write_config(dir: &Path) -> PathBuf {
    let yaml = r#"
params:
  char_num: ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ',', '$']
  density_encoder:
    a: 0.32
    e: 0.41
    i: 0.28
    n: 0.25
    o: 0.30
    t: 0.35
    v: 0.12
    c: 0.18
    l: 0.15
    m: 0.22
  inv_density_encoder:
    a: 0.68
    e: 0.59
    i: 0.72
    n: 0.75
    o: 0.70
    t: 0.65
    v: 0.88
    c: 0.82
    l: 0.85
    m: 0.78
  model_config:
    learning_rate: 0.3
    max_rounds: 15
    max_depth: 3
    min_samples_split: 2
    early_stopping_rounds: 5
  conversion_map:
    - 0: 0
    - 1: 1
    - 2: 1
  semantic_range: [10.0, 90.0]
  encode_mean: [0.2, 0.8]
  morph_mean: [-0.5, 0.5]
"#;
    let path = dir.join("semtok.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

/// Write two labeled corpus files with cleanly separable token classes.
fn write_corpus(dir: &Path) {
    let mut page_a = String::from("{");
    let mut page_b = String::from("{");

    let words = ["invoice", "total", "amount", "client", "note", "item"];
    let numbers = ["1234", "5,600", "$1,200.50", "778", "42.00", "9,99"];

    for (i, word) in words.iter().enumerate() {
        for copy in 0..3 {
            page_a.push_str(&format!(
                r#""w{i}_{copy}": {{"text": "{word}", "semantic_clasification": 0}},"#
            ));
        }
    }
    for (i, number) in numbers.iter().enumerate() {
        for copy in 0..3 {
            page_b.push_str(&format!(
                r#""n{i}_{copy}": {{"text": "{number}", "semantic_clasification": 1}},"#
            ));
        }
    }

    // One null payload and one whitespace token per file; both must be
    // skipped without failing the run.
    page_a.push_str(r#""skip_null": null,"#);
    page_a.push_str(r#""skip_blank": {"text": "   "}}"#);
    page_b.push_str(r#""skip_null": null,"#);
    page_b.push_str(r#""skip_blank": {"text": ""}}"#);

    fs::write(dir.join("page_a.json"), page_a).unwrap();
    fs::write(dir.join("page_b.json"), page_b).unwrap();
}

#[test]
fn test_train_pipeline_end_to_end() -> Result<()> {
    // 1. Assemble config + corpus in a scratch directory
    let workspace = TempDir::new().unwrap();
    let config_path = write_config(workspace.path());
    let corpus_dir = workspace.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();
    write_corpus(&corpus_dir);

    let config = Config::load(&config_path)?;

    // 2. Train and persist
    let out_dir = workspace.path().join("out");
    let outcome = trainer::train_semantic_model(
        &config,
        &corpus_dir,
        &out_dir,
        TrainOptions::default(),
    )?;

    // 36 labeled tokens survive; the null/blank entries drop out.
    assert_eq!(outcome.rows, 36);
    assert!(outcome.stats.rounds > 0);
    assert!(outcome.evaluation.held_out > 0);
    assert!(outcome.evaluation.accuracy >= 0.5);

    // 3. The artifact exists at the stable location and round-trips
    let expected_path = out_dir.join("models").join(SEMANTIC_MODEL_FILE);
    assert_eq!(outcome.artifact_path, expected_path);
    assert!(expected_path.exists());

    let artifact = load_artifact(&expected_path)?;
    assert_eq!(artifact.schema_version, 1);
    assert_eq!(artifact.feature_names.len(), 14);
    assert_eq!(artifact.feature_names[0], "mean_encoded");
    assert!(artifact.model.is_trained());
    // RFC 3339 timestamp
    assert!(artifact.model_time.contains('T'));

    // 4. The restored model still predicts a valid class
    let predicted = artifact.model.predict(&[0.0; 14]);
    assert!((0..artifact.model.n_classes() as i32).contains(&predicted));

    Ok(())
}

#[test]
fn test_empty_corpus_fails_without_artifact() {
    let workspace = TempDir::new().unwrap();
    let config_path = write_config(workspace.path());
    let corpus_dir = workspace.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();

    let config = Config::load(&config_path).unwrap();
    let out_dir = workspace.path().join("out");

    let result = trainer::train_semantic_model(
        &config,
        &corpus_dir,
        &out_dir,
        TrainOptions::default(),
    );

    assert!(result.is_err());
    // Training failed before persistence: nothing may exist on disk.
    assert!(!out_dir.join("models").join(SEMANTIC_MODEL_FILE).exists());
}

#[test]
fn test_features_command_exports_rows() -> Result<()> {
    let workspace = TempDir::new().unwrap();
    let config_path = write_config(workspace.path());
    let corpus_dir = workspace.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();
    write_corpus(&corpus_dir);

    let output_path = workspace.path().join("export").join("features.json");
    let args = SemtokArgs::parse_from([
        "semtok",
        "-q",
        "features",
        "-c",
        config_path.to_str().unwrap(),
        corpus_dir.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
    ]);
    execute_command(args)?;

    let rows: Vec<DatasetRow> = serde_json::from_str(&fs::read_to_string(&output_path)?)?;
    assert_eq!(rows.len(), 36);

    let numeric_row = rows.iter().find(|r| r.text == "1234").unwrap();
    assert_eq!(numeric_row.label_original, 1);
    assert_eq!(numeric_row.label_mapped, 1);
    // num_pct for an all-digit token
    assert_eq!(numeric_row.features.0[9], 100.0);

    // Raw label 2 would remap onto 1; raw 0 stays 0.
    let word_row = rows.iter().find(|r| r.text == "invoice").unwrap();
    assert_eq!(word_row.label_mapped, 0);

    Ok(())
}

#[test]
fn test_determinism_across_runs() -> Result<()> {
    let workspace = TempDir::new().unwrap();
    let config_path = write_config(workspace.path());
    let corpus_dir = workspace.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();
    write_corpus(&corpus_dir);

    let config = Config::load(&config_path)?;

    let out_a = workspace.path().join("run_a");
    let out_b = workspace.path().join("run_b");
    let outcome_a =
        trainer::train_semantic_model(&config, &corpus_dir, &out_a, TrainOptions::default())?;
    let outcome_b =
        trainer::train_semantic_model(&config, &corpus_dir, &out_b, TrainOptions::default())?;

    // Same corpus, config and seed: identical split and training path.
    assert_eq!(outcome_a.rows, outcome_b.rows);
    assert_eq!(outcome_a.stats.rounds, outcome_b.stats.rounds);
    assert_eq!(outcome_a.evaluation.accuracy, outcome_b.evaluation.accuracy);

    Ok(())
}
