//! Population statistics over encoded character sequences.

use serde::{Deserialize, Serialize};

/// Population mean, standard deviation and variance of a value sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
}

impl ValueSummary {
    /// The all-zero summary produced for empty sequences.
    pub fn zero() -> Self {
        ValueSummary {
            mean: 0.0,
            std_dev: 0.0,
            variance: 0.0,
        }
    }
}

/// Reduce a value sequence to its population statistics.
///
/// Divides by N (population form, not the N-1 sample form). An empty
/// sequence reduces to `(0.0, 0.0, 0.0)`.
pub fn summarize(values: &[f64]) -> ValueSummary {
    if values.is_empty() {
        return ValueSummary::zero();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    ValueSummary {
        mean,
        std_dev: variance.sqrt(),
        variance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sequence() {
        assert_eq!(summarize(&[]), ValueSummary::zero());
    }

    #[test]
    fn test_singleton_sequence() {
        let summary = summarize(&[3.5]);
        assert_eq!(summary.mean, 3.5);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.variance, 0.0);
    }

    #[test]
    fn test_population_variance() {
        // Population variance of [1, 2, 3, 4] is 1.25, not the 5/3 a
        // sample estimator would give.
        let summary = summarize(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.variance - 1.25).abs() < 1e-12);
        assert!((summary.std_dev - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_constant_sequence() {
        let summary = summarize(&[0.7, 0.7, 0.7]);
        assert!((summary.mean - 0.7).abs() < 1e-12);
        assert_eq!(summary.variance, 0.0);
    }
}
