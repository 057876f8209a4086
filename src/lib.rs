//! # semtok
//!
//! Semantic classification of OCR-extracted text tokens.
//!
//! A token's text reduces to a fixed-order numeric feature vector through
//! character-level statistical encodings (density-weighted,
//! inverse-density-weighted, morphological), percentage composition and
//! textual marker counts. The vectors feed a gradient-boosted-tree
//! classifier trained from labeled corpora; a threshold-based rule cascade
//! covers bootstrap labeling when no trained model exists.
//!
//! ## Pipeline
//!
//! corpus files → [`dataset::DatasetBuilder`] → [`features::FeatureExtractor`]
//! → [`labels::LabelMapper`] → [`trainer`] → persisted model artifact

pub mod cli;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod features;
pub mod labels;
pub mod model;
pub mod rules;
pub mod trainer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
