//! Character-level statistical encodings.
//!
//! Two weighting tables (density and inverse density) turn a token into a
//! numeric sequence; the morphological encoding maps each character onto a
//! ternary digit-like / alphabetic / other scale. All encodings operate on
//! the token with whitespace removed.

use std::collections::{HashMap, HashSet};

use crate::config::Params;

/// Immutable per-run encoder tables.
///
/// Lookups against the weight tables default to `0.0` for unmapped
/// characters; `char_num` membership decides what counts as numeric.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    char_num: HashSet<char>,
    density: HashMap<char, f64>,
    inv_density: HashMap<char, f64>,
}

impl EncoderConfig {
    pub fn new(
        char_num: HashSet<char>,
        density: HashMap<char, f64>,
        inv_density: HashMap<char, f64>,
    ) -> Self {
        EncoderConfig {
            char_num,
            density,
            inv_density,
        }
    }

    /// Build the encoder tables from the loaded config params.
    pub fn from_params(params: &Params) -> Self {
        EncoderConfig {
            char_num: params.char_num.iter().copied().collect(),
            density: params.density_encoder.clone(),
            inv_density: params.inv_density_encoder.clone(),
        }
    }

    /// Whether a character counts as numeric.
    pub fn is_numeric_char(&self, ch: char) -> bool {
        self.char_num.contains(&ch)
    }

    pub fn char_num(&self) -> &HashSet<char> {
        &self.char_num
    }

    pub fn density(&self) -> &HashMap<char, f64> {
        &self.density
    }

    pub fn inv_density(&self) -> &HashMap<char, f64> {
        &self.inv_density
    }
}

/// Whether a token survives validation: at least one non-whitespace char.
pub fn is_valid_text(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Encode a token through a character weight table.
///
/// The token is lowercased and stripped of whitespace; every remaining
/// character maps through the table, defaulting to `0.0` when absent.
/// Invalid (empty or all-whitespace) text encodes to an empty sequence.
pub fn encode_text(text: &str, table: &HashMap<char, f64>) -> Vec<f64> {
    if !is_valid_text(text) {
        return Vec::new();
    }

    text.to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| table.get(&ch).copied().unwrap_or(0.0))
        .collect()
}

/// Morphological encoding: `+1.0` for numeric characters, `-1.0` for
/// alphabetic ones, `0.0` otherwise.
///
/// Case is preserved (membership in `char_num` is case-sensitive and
/// `is_alphabetic` is case-insensitive anyway); whitespace is stripped.
pub fn morphological_encode(text: &str, char_num: &HashSet<char>) -> Vec<f64> {
    if !is_valid_text(text) {
        return Vec::new();
    }

    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| {
            if char_num.contains(&ch) {
                1.0
            } else if ch.is_alphabetic() {
                -1.0
            } else {
                0.0
            }
        })
        .collect()
}
