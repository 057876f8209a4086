//! Command implementations for the semtok CLI.

use std::fs;

use crate::cli::args::*;
use crate::config::Config;
use crate::dataset::DatasetBuilder;
use crate::error::Result;
use crate::features::FeatureExtractor;
use crate::features::encoding::EncoderConfig;
use crate::labels::LabelMapper;
use crate::rules::{RegexMarkerMatcher, SemanticRuleClassifier};
use crate::trainer::{self, TrainOptions, TrainOutcome};

/// Execute a CLI command.
pub fn execute_command(args: SemtokArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::TrainHeader(train_args) => train_header(train_args.clone(), &args),
        Command::Features(features_args) => export_features(features_args.clone(), &args),
        Command::Classify(classify_args) => classify(classify_args.clone(), &args),
    }
}

fn train_options(args: &TrainArgs) -> TrainOptions {
    TrainOptions {
        test_fraction: args.test_fraction,
        seed: args.seed,
    }
}

fn report_outcome(outcome: &TrainOutcome, cli_args: &SemtokArgs) {
    if cli_args.verbosity() == 0 {
        return;
    }

    println!(
        "Trained on {} rows in {} rounds{} ({} ms)",
        outcome.rows,
        outcome.stats.rounds,
        if outcome.stats.early_stopped {
            " (early stopped)"
        } else {
            ""
        },
        outcome.stats.training_time_ms,
    );
    println!(
        "Held-out accuracy: {:.4} over {} rows",
        outcome.evaluation.accuracy, outcome.evaluation.held_out
    );
    for class in &outcome.evaluation.per_class {
        let original = class
            .label_original
            .map(|l| format!(" (raw {l})"))
            .unwrap_or_default();
        println!(
            "  class {}{}: {}/{} correct",
            class.label_mapped, original, class.correct, class.support
        );
    }
    println!("Artifact: {}", outcome.artifact_path.display());
}

/// Train the semantic token classifier.
fn train(args: TrainArgs, cli_args: &SemtokArgs) -> Result<()> {
    let config = Config::load(&args.config)?;

    if cli_args.verbosity() > 1 {
        println!("Corpus: {}", args.corpus_dir.display());
    }

    let outcome = trainer::train_semantic_model(
        &config,
        &args.corpus_dir,
        &args.out_dir,
        train_options(&args),
    )?;
    report_outcome(&outcome, cli_args);
    Ok(())
}

/// Train the geometry-based header classifier.
fn train_header(args: TrainArgs, cli_args: &SemtokArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let outcome = trainer::train_header_model(
        &config,
        &args.corpus_dir,
        &args.out_dir,
        train_options(&args),
    )?;
    report_outcome(&outcome, cli_args);
    Ok(())
}

/// Extract feature rows without training.
fn export_features(args: FeaturesArgs, cli_args: &SemtokArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let extractor = FeatureExtractor::new(EncoderConfig::from_params(&config.params));
    let mapper = LabelMapper::build(&config.params.conversion_map)?;

    let dataset = DatasetBuilder::new(&extractor, &mapper).build(&args.corpus_dir)?;
    let json = serde_json::to_string_pretty(dataset.rows())?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
            if cli_args.verbosity() > 0 {
                println!("Wrote {} feature rows to {}", dataset.len(), path.display());
            }
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Run the rule cascade over a corpus and print one class per token.
fn classify(args: ClassifyArgs, cli_args: &SemtokArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let extractor = FeatureExtractor::new(EncoderConfig::from_params(&config.params));
    let mapper = LabelMapper::build(&config.params.conversion_map)?;

    let matcher = RegexMarkerMatcher::with_domain_keywords(&args.domain_keywords)?;
    let classifier = SemanticRuleClassifier::new(config.thresholds(), Box::new(matcher));

    let dataset = DatasetBuilder::new(&extractor, &mapper).build(&args.corpus_dir)?;
    for row in dataset.rows() {
        let class = classifier.classify_features(&row.text, &row.features);
        if cli_args.verbosity() > 0 {
            println!("{}\t{}\t{:?}", class.code(), row.text, class);
        } else {
            println!("{}\t{}", class.code(), row.text);
        }
    }

    Ok(())
}
