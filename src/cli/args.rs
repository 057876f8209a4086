//! Command line argument parsing for the semtok CLI using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// semtok - semantic classification of OCR-extracted text tokens
#[derive(Parser, Debug, Clone)]
#[command(name = "semtok")]
#[command(about = "Train and apply semantic classifiers for OCR text tokens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SemtokArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SemtokArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the semantic token classifier from a labeled corpus
    Train(TrainArgs),

    /// Train the geometry-based header classifier
    #[command(name = "train-header")]
    TrainHeader(TrainArgs),

    /// Extract feature rows from a corpus without training
    Features(FeaturesArgs),

    /// Classify corpus tokens with the rule cascade (no trained model)
    Classify(ClassifyArgs),
}

/// Arguments shared by the two training commands
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: PathBuf,

    /// Directory containing labeled corpus JSON files
    #[arg(value_name = "CORPUS_DIR")]
    pub corpus_dir: PathBuf,

    /// Output root; the artifact lands under <OUT_DIR>/models/
    #[arg(short, long, value_name = "OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Fraction of rows held out for validation
    #[arg(long, default_value = "0.2")]
    pub test_fraction: f64,

    /// Random seed for the stratified split
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for feature-only extraction
#[derive(Parser, Debug, Clone)]
pub struct FeaturesArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: PathBuf,

    /// Directory containing labeled corpus JSON files
    #[arg(value_name = "CORPUS_DIR")]
    pub corpus_dir: PathBuf,

    /// Output JSON file for the flat feature rows (stdout when omitted)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for rule-cascade classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: PathBuf,

    /// Directory containing corpus JSON files
    #[arg(value_name = "CORPUS_DIR")]
    pub corpus_dir: PathBuf,

    /// Domain-marker keyword; repeat for several
    #[arg(long = "domain-keyword", value_name = "KEYWORD")]
    pub domain_keywords: Vec<String>,
}
