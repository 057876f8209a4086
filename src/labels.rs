//! Semantic class codes and raw-to-training label remapping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SemtokError};

/// Semantic category assigned to a token.
///
/// The numeric codes are the on-disk/corpus representation and the output
/// space of the rule cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticClass {
    /// Free-running descriptive text.
    Descriptive,
    /// Numeric content (amounts, counts, identifiers made of digits).
    Numeric,
    /// Quantities carrying an explicit unit or magnitude marker.
    Quantitative,
    /// Code-like mixed alphanumeric content.
    Code,
    /// Tokens matching a configured domain marker.
    DomainMarker,
}

impl SemanticClass {
    /// The integer code used in corpora and classifier output.
    pub fn code(&self) -> i32 {
        match self {
            SemanticClass::Descriptive => 0,
            SemanticClass::Numeric => 1,
            SemanticClass::Quantitative => 2,
            SemanticClass::Code => -1,
            SemanticClass::DomainMarker => -2,
        }
    }

    /// Resolve a code back to its class, if it names one.
    pub fn from_code(code: i32) -> Option<SemanticClass> {
        match code {
            0 => Some(SemanticClass::Descriptive),
            1 => Some(SemanticClass::Numeric),
            2 => Some(SemanticClass::Quantitative),
            -1 => Some(SemanticClass::Code),
            -2 => Some(SemanticClass::DomainMarker),
            _ => None,
        }
    }
}

/// Total raw-label to training-label mapping built from the configured
/// conversion map.
///
/// Raw labels absent from the table map to `0`. Conflicting entries (same
/// raw label, different targets) are rejected at build time; exact
/// duplicates are tolerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMapper {
    forward: HashMap<i32, i32>,
    /// First raw label observed for each mapped value, for reporting in the
    /// original label space.
    inverse: HashMap<i32, i32>,
}

impl LabelMapper {
    /// Flatten the ordered sequence of single-entry records into one total
    /// mapping.
    pub fn build(conversion_map: &[HashMap<i32, i32>]) -> Result<LabelMapper> {
        let mut forward = HashMap::new();
        let mut inverse = HashMap::new();

        for record in conversion_map {
            for (&raw, &mapped) in record {
                match forward.get(&raw) {
                    Some(&existing) if existing != mapped => {
                        return Err(SemtokError::LabelConflict {
                            raw,
                            first: existing,
                            second: mapped,
                        });
                    }
                    Some(_) => {}
                    None => {
                        forward.insert(raw, mapped);
                        inverse.entry(mapped).or_insert(raw);
                    }
                }
            }
        }

        Ok(LabelMapper { forward, inverse })
    }

    /// Map a raw label to its training label; unmapped labels go to `0`.
    pub fn map(&self, raw: i32) -> i32 {
        self.forward.get(&raw).copied().unwrap_or(0)
    }

    /// Map a training label back to the first raw label that produced it.
    pub fn invert(&self, mapped: i32) -> Option<i32> {
        self.inverse.get(&mapped).copied()
    }

    /// Distinct training labels, sorted ascending.
    pub fn mapped_values(&self) -> Vec<i32> {
        let mut values: Vec<i32> = self.forward.values().copied().collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
