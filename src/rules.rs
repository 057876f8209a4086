//! Threshold-based semantic rule cascade.
//!
//! Assigns a [`SemanticClass`] to a token from its aggregate statistics
//! without a trained model, for bootstrap labeling or as a rule-based
//! fallback. The cascade is an explicit ordered list of named
//! (predicate, class) rules; the first matching rule wins and the order is
//! part of the contract.

use regex::Regex;

use crate::config::ThresholdConfig;
use crate::error::{Result, SemtokError};
use crate::features::FeatureVector;
use crate::labels::SemanticClass;

/// Text pattern collaborators consulted by the cascade.
///
/// The cascade only depends on this trait; deployments with authoritative
/// marker definitions plug them in here without touching the rule order.
pub trait MarkerMatcher: Send + Sync {
    /// Whether the token carries an explicit quantitative marker
    /// (a magnitude with a unit, percent sign, etc.).
    fn contains_quantitative_marker(&self, text: &str) -> bool;

    /// Whether the token matches a configured domain marker.
    fn contains_domain_marker(&self, text: &str) -> bool;

    /// Secondary quantitative check applied to mostly-numeric tokens to
    /// split formatted amounts from bare numbers.
    fn quantitative_pattern(&self, text: &str) -> bool;
}

/// Default regex-backed [`MarkerMatcher`].
///
/// Quantitative markers are digits followed by a unit, percent or currency
/// code. Domain markers are a keyword alternation supplied at build time;
/// with no keywords configured the domain rule never fires.
pub struct RegexMarkerMatcher {
    quantitative: Regex,
    amount: Regex,
    domain: Option<Regex>,
}

impl RegexMarkerMatcher {
    pub fn new() -> Result<Self> {
        Self::with_domain_keywords(&[])
    }

    /// Build the matcher with a set of domain-marker keywords matched
    /// case-insensitively as whole words.
    pub fn with_domain_keywords(keywords: &[String]) -> Result<Self> {
        let quantitative =
            compile(r"(?i)\d\s*(%|°c?|km|cm|mm|kg|mg|ml|kwh|kw|hz|gb|mb|h\b|m\b|g\b|l\b)")?;
        let amount = compile(r"^[$€]?\d{1,3}([.,]\d{3})*([.,]\d+)?$")?;

        let domain = if keywords.is_empty() {
            None
        } else {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(&format!(r"(?i)\b({alternation})\b"))?)
        };

        Ok(RegexMarkerMatcher {
            quantitative,
            amount,
            domain,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| SemtokError::config(format!("invalid marker pattern {pattern:?}: {e}")))
}

impl MarkerMatcher for RegexMarkerMatcher {
    fn contains_quantitative_marker(&self, text: &str) -> bool {
        self.quantitative.is_match(text)
    }

    fn contains_domain_marker(&self, text: &str) -> bool {
        self.domain.as_ref().is_some_and(|re| re.is_match(text))
    }

    fn quantitative_pattern(&self, text: &str) -> bool {
        self.amount.is_match(text.trim())
    }
}

/// Aggregate statistics the cascade decides on.
#[derive(Debug, Clone, Copy)]
pub struct TokenStats {
    /// Numeric-composition percentage.
    pub pct: f64,
    /// Density-encoded mean.
    pub poly_mean: f64,
    /// Inverse-density mean.
    pub inv_poly_mean: f64,
    /// Morphological mean.
    pub poly_morph_mean: f64,
}

impl TokenStats {
    /// Pull the cascade inputs out of a full feature vector.
    pub fn from_features(features: &FeatureVector) -> Self {
        TokenStats {
            pct: features.num_pct(),
            poly_mean: features.mean_encoded(),
            inv_poly_mean: features.inv_mean_encoded(),
            poly_morph_mean: features.mean_morph(),
        }
    }
}

type Predicate = fn(&SemanticRuleClassifier, &str, &TokenStats) -> bool;

/// One named rule in the cascade.
struct Rule {
    name: &'static str,
    class: SemanticClass,
    applies: Predicate,
}

/// Rule-based token classifier. Stateless: a pure function of its inputs,
/// the thresholds and the marker matcher.
pub struct SemanticRuleClassifier {
    thresholds: ThresholdConfig,
    matcher: Box<dyn MarkerMatcher>,
}

impl SemanticRuleClassifier {
    pub fn new(thresholds: ThresholdConfig, matcher: Box<dyn MarkerMatcher>) -> Self {
        SemanticRuleClassifier {
            thresholds,
            matcher,
        }
    }

    /// The ordered cascade. First match wins.
    fn rules() -> [Rule; 5] {
        [
            Rule {
                name: "quantitative_marker",
                class: SemanticClass::Quantitative,
                applies: |c, text, _| c.matcher.contains_quantitative_marker(text),
            },
            Rule {
                name: "domain_marker",
                class: SemanticClass::DomainMarker,
                applies: |c, text, _| c.matcher.contains_domain_marker(text),
            },
            Rule {
                name: "numeric_amount",
                class: SemanticClass::Quantitative,
                applies: |c, text, stats| {
                    c.numeric_shape(stats) && c.matcher.quantitative_pattern(text)
                },
            },
            Rule {
                name: "numeric",
                class: SemanticClass::Numeric,
                applies: |c, _, stats| c.numeric_shape(stats),
            },
            Rule {
                name: "code",
                class: SemanticClass::Code,
                applies: |c, _, stats| {
                    let t = &c.thresholds;
                    t.semantic_range.lo < stats.pct
                        && stats.pct < t.semantic_range.hi
                        && t.morph_mean.lo < stats.poly_morph_mean
                        && stats.poly_morph_mean < t.morph_mean.hi
                },
            },
        ]
    }

    /// Shared shape test for rules 3 and 4: digit-dominated morphology, low
    /// density mean, high inverse-density mean, numeric composition above
    /// the semantic band.
    fn numeric_shape(&self, stats: &TokenStats) -> bool {
        let t = &self.thresholds;
        t.morph_mean.hi < stats.poly_morph_mean
            && stats.poly_mean < t.encode_mean.lo
            && t.encode_mean.hi < stats.inv_poly_mean
            && t.semantic_range.hi < stats.pct
    }

    /// Classify a token from its aggregate statistics.
    pub fn classify(&self, text: &str, stats: &TokenStats) -> SemanticClass {
        for rule in Self::rules() {
            if (rule.applies)(self, text, stats) {
                log::debug!("token {:?} matched rule {}", text, rule.name);
                return rule.class;
            }
        }
        SemanticClass::Descriptive
    }

    /// Classify straight from a full feature vector.
    pub fn classify_features(&self, text: &str, features: &FeatureVector) -> SemanticClass {
        self.classify(text, &TokenStats::from_features(features))
    }

    /// Rule names in evaluation order, for auditing.
    pub fn rule_names() -> Vec<&'static str> {
        Self::rules().iter().map(|r| r.name).collect()
    }
}
