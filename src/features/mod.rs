//! Feature extraction for token classification.
//!
//! A token's text reduces to a fixed-order vector of [`FEATURE_DIM`] floats.
//! The order is a positional contract: the trainer and every persisted
//! artifact depend on indices, not names, so reordering is a breaking
//! change. [`FEATURE_NAMES`] travels with the artifact for documentation.

pub mod composition;
pub mod encoding;
pub mod geometry;
pub mod stats;

use serde::{Deserialize, Serialize};

use crate::features::composition::{analyze_composition, count_text_markers};
use crate::features::encoding::{EncoderConfig, encode_text, is_valid_text, morphological_encode};
use crate::features::stats::summarize;

/// Number of features per token.
pub const FEATURE_DIM: usize = 14;

/// Feature names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "mean_encoded",
    "std_encoded",
    "var_encoded",
    "inv_mean_encoded",
    "inv_std_encoded",
    "inv_var_encoded",
    "mean_morph",
    "std_morph",
    "var_morph",
    "num_pct",
    "alpha_pct",
    "spc_pct",
    "word_len",
    "money",
];

/// A fixed-order vector of `FEATURE_DIM` floats for one token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f32; FEATURE_DIM]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Density-encoded mean (`mean_encoded`).
    pub fn mean_encoded(&self) -> f64 {
        self.0[0] as f64
    }

    /// Inverse-density mean (`inv_mean_encoded`).
    pub fn inv_mean_encoded(&self) -> f64 {
        self.0[3] as f64
    }

    /// Morphological mean (`mean_morph`).
    pub fn mean_morph(&self) -> f64 {
        self.0[6] as f64
    }

    /// Numeric-composition percentage (`num_pct`).
    pub fn num_pct(&self) -> f64 {
        self.0[9] as f64
    }
}

/// Extracts feature vectors from token text under a fixed encoder config.
///
/// Extraction is a pure function of the text and the tables: the same input
/// always produces a bit-identical vector.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    encoders: EncoderConfig,
}

impl FeatureExtractor {
    pub fn new(encoders: EncoderConfig) -> Self {
        FeatureExtractor { encoders }
    }

    pub fn encoders(&self) -> &EncoderConfig {
        &self.encoders
    }

    /// Whether the text would survive extraction at all.
    pub fn accepts(&self, text: &str) -> bool {
        is_valid_text(text)
    }

    /// Compute the feature vector for a token.
    ///
    /// Invalid (empty or all-whitespace) text yields the all-zero vector:
    /// the encoders produce empty sequences, whose statistics are zero, and
    /// the composition of zero characters is zero across the board.
    pub fn extract(&self, text: &str) -> FeatureVector {
        let encoded = summarize(&encode_text(text, self.encoders.density()));
        let inv_encoded = summarize(&encode_text(text, self.encoders.inv_density()));
        let morph = summarize(&morphological_encode(text, self.encoders.char_num()));
        let comp = analyze_composition(text, self.encoders.char_num());
        let money = count_text_markers(text);

        let features = FeatureVector([
            encoded.mean as f32,
            encoded.std_dev as f32,
            encoded.variance as f32,
            inv_encoded.mean as f32,
            inv_encoded.std_dev as f32,
            inv_encoded.variance as f32,
            morph.mean as f32,
            morph.std_dev as f32,
            morph.variance as f32,
            comp.num_pct as f32,
            comp.alpha_pct as f32,
            comp.spc_pct as f32,
            comp.word_len as f32,
            money as f32,
        ]);

        if log::log_enabled!(log::Level::Debug) {
            let dump: Vec<String> = FEATURE_NAMES
                .iter()
                .zip(features.0.iter())
                .map(|(name, value)| format!("{name}: {value:.4}"))
                .collect();
            log::debug!("features for {text:?}: {}", dump.join(", "));
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn test_extractor() -> FeatureExtractor {
        let char_num = "0123456789.,$".chars().collect();
        let density: HashMap<char, f64> =
            HashMap::from([('a', 0.1), ('b', 0.2), ('1', 0.9), ('2', 0.8)]);
        let inv_density: HashMap<char, f64> =
            HashMap::from([('a', 0.9), ('b', 0.8), ('1', 0.1), ('2', 0.2)]);
        FeatureExtractor::new(EncoderConfig::new(char_num, density, inv_density))
    }

    #[test]
    fn test_vector_dimension_and_names() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_DIM);
        let features = test_extractor().extract("ab12");
        assert_eq!(features.as_slice().len(), FEATURE_DIM);
    }

    #[test]
    fn test_invalid_text_is_all_zero() {
        for text in ["", "   ", "\t\n"] {
            let features = test_extractor().extract(text);
            assert!(
                features.as_slice().iter().all(|&v| v == 0.0),
                "{text:?} should extract to zeros"
            );
        }
    }

    #[test]
    fn test_feature_order() {
        let extractor = test_extractor();
        let features = extractor.extract("ab12");

        // density encodings of a,b,1,2 -> [0.1, 0.2, 0.9, 0.8], mean 0.5
        assert!((features.mean_encoded() - 0.5).abs() < 1e-6);
        // inverse table mirrors it around 0.5
        assert!((features.inv_mean_encoded() - 0.5).abs() < 1e-6);
        // two alpha (-1) and two numeric (+1) chars, morph mean 0
        assert_eq!(features.mean_morph(), 0.0);
        // half the chars are numeric
        assert_eq!(features.num_pct(), 50.0);
        assert_eq!(features.0[10], 50.0); // alpha_pct
        assert_eq!(features.0[11], 0.0); // spc_pct
        assert_eq!(features.0[12], 4.0); // word_len
        assert_eq!(features.0[13], 0.0); // money
    }

    #[test]
    fn test_money_counts_raw_text() {
        let features = test_extractor().extract("$1,2.0");
        assert_eq!(features.0[13], 3.0);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = test_extractor();
        let first = extractor.extract("Invoice $1,200.50");
        let second = extractor.extract("Invoice $1,200.50");
        assert_eq!(first, second);
    }
}
