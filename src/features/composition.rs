//! Percentage composition and textual marker analysis.

use std::collections::HashSet;

/// Percentage composition of a token's non-whitespace characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition {
    /// Percentage of characters in the numeric set.
    pub num_pct: f64,
    /// Percentage of alphabetic characters outside the numeric set.
    pub alpha_pct: f64,
    /// Percentage of everything else.
    pub spc_pct: f64,
    /// Non-whitespace character count.
    pub word_len: usize,
}

impl Composition {
    pub fn empty() -> Self {
        Composition {
            num_pct: 0.0,
            alpha_pct: 0.0,
            spc_pct: 0.0,
            word_len: 0,
        }
    }
}

/// Classify a token's characters into numeric / alphabetic / other and
/// compute the percentage split.
///
/// Alphabetic characters that are also in `char_num` count as numeric only,
/// so the three percentages always partition 100. `spc_pct` is derived as
/// the remainder and clamped to exactly `0.0` when numeric + alphabetic
/// reach 100, keeping rounding noise out of the third bucket.
pub fn analyze_composition(text: &str, char_num: &HashSet<char>) -> Composition {
    let chars: Vec<char> = text.chars().filter(|ch| !ch.is_whitespace()).collect();
    let word_len = chars.len();
    if word_len == 0 {
        return Composition::empty();
    }

    let total = word_len as f64;
    let num_count = chars.iter().filter(|ch| char_num.contains(ch)).count();
    let alpha_count = chars
        .iter()
        .filter(|ch| ch.is_alphabetic() && !char_num.contains(ch))
        .count();

    let num_pct = num_count as f64 / total * 100.0;
    let alpha_pct = alpha_count as f64 / total * 100.0;

    let alphanum = num_pct + alpha_pct;
    let spc_pct = if alphanum == 100.0 {
        0.0
    } else {
        100.0 - alphanum
    };

    Composition {
        num_pct,
        alpha_pct,
        spc_pct,
        word_len,
    }
}

/// Count the textual money/punctuation markers `.`, `,` and `$` in the raw
/// (unstripped) token.
pub fn count_text_markers(text: &str) -> f64 {
    text.chars()
        .filter(|&ch| ch == '.' || ch == ',' || ch == '$')
        .count() as f64
}
