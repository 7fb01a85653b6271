//! Evidence scoring for candidate relationships.
//!
//! Confidence is a fixed weighted sum over four independent factors, each in
//! [0, 1] and each recorded as its own evidence entry, so every score is
//! explainable factor by factor. Weights come from configuration and are
//! never learned.

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::profile::{ColumnProfile, TableProfile};

use super::candidates::CandidateSkeleton;
use super::{Cardinality, Evidence, RelationshipCandidate, ValueSamples};

/// Number of evidence factors the scoring model defines. Every scored
/// candidate carries exactly this many evidence entries.
pub const FACTOR_COUNT: usize = 4;

/// Target uniqueness above which a column counts as near-unique for
/// cardinality inference.
const NEAR_UNIQUE: f64 = 0.9;
/// Source-to-target uniqueness ratio below which the source side is "many".
const WELL_BELOW: f64 = 0.7;
/// Uniqueness below which both sides look like join-table columns.
const LOW_UNIQUENESS: f64 = 0.6;

/// Scores candidate skeletons against profiles and sampled values.
pub struct EvidenceScorer<'a> {
    config: &'a AnalysisConfig,
    profiles: &'a BTreeMap<String, TableProfile>,
    values: &'a ValueSamples,
}

impl<'a> EvidenceScorer<'a> {
    pub fn new(
        config: &'a AnalysisConfig,
        profiles: &'a BTreeMap<String, TableProfile>,
        values: &'a ValueSamples,
    ) -> Self {
        Self {
            config,
            profiles,
            values,
        }
    }

    /// Score a skeleton, producing the finished candidate.
    ///
    /// Returns `None` when the confidence falls below the configured floor
    /// (the only place a candidate is dropped) or when either profile is
    /// missing the referenced column.
    pub fn score(&self, skeleton: CandidateSkeleton) -> Option<RelationshipCandidate> {
        let source = self
            .profiles
            .get(&skeleton.source_table)?
            .column(&skeleton.source_column)?;
        let target = self
            .profiles
            .get(&skeleton.target_table)?
            .column(&skeleton.target_column)?;

        let naming = Evidence {
            factor: "naming".to_string(),
            raw: skeleton.naming_strength,
            weight: self.config.weights.naming,
            contribution: 0.0,
            detail: format!(
                "rule '{}' matched column '{}' against table '{}'",
                skeleton.rule, skeleton.source_column, skeleton.target_table
            ),
        };

        let compatibility = source.inferred_type.compatibility(target.inferred_type);
        let types = Evidence {
            factor: "type_compatibility".to_string(),
            raw: compatibility,
            weight: self.config.weights.type_compatibility,
            contribution: 0.0,
            detail: format!(
                "{} vs {}",
                source.inferred_type, target.inferred_type
            ),
        };

        let uniqueness = Evidence {
            factor: "target_uniqueness".to_string(),
            raw: target.unique_ratio,
            weight: self.config.weights.target_uniqueness,
            contribution: 0.0,
            detail: format!(
                "target '{}.{}' is {:.0}% distinct in sample",
                skeleton.target_table,
                skeleton.target_column,
                target.unique_ratio * 100.0
            ),
        };

        let (containment, containment_detail) = self.containment(&skeleton);
        let overlap = Evidence {
            factor: "value_overlap".to_string(),
            raw: containment,
            weight: self.config.weights.value_overlap,
            contribution: 0.0,
            detail: containment_detail,
        };

        let mut evidence = vec![naming, types, uniqueness, overlap];
        debug_assert_eq!(evidence.len(), FACTOR_COUNT);

        let total_weight = self.config.weights.total();
        let mut weighted_sum = 0.0;
        for entry in &mut evidence {
            entry.contribution = entry.raw * entry.weight / total_weight;
            weighted_sum += entry.contribution;
        }
        let confidence = weighted_sum.clamp(0.0, 1.0);

        if confidence < self.config.min_confidence {
            return None;
        }

        Some(RelationshipCandidate {
            source_table: skeleton.source_table,
            source_column: skeleton.source_column,
            target_table: skeleton.target_table,
            target_column: skeleton.target_column,
            rule: skeleton.rule.to_string(),
            rule_precedence: skeleton.rule_precedence,
            self_reference: skeleton.self_reference,
            cardinality: infer_cardinality(source, target),
            confidence,
            evidence,
        })
    }

    /// Sample-based containment: fraction of sampled source values found in
    /// the sampled target value set. A proxy for a foreign-key join; full
    /// joins across the real tables are out of budget.
    fn containment(&self, skeleton: &CandidateSkeleton) -> (f64, String) {
        let source_values = self
            .values
            .get(&skeleton.source_table, &skeleton.source_column);
        let target_values = self
            .values
            .get(&skeleton.target_table, &skeleton.target_column);

        match (source_values, target_values) {
            (Some(source), Some(target)) if !source.is_empty() => {
                let found = source.iter().filter(|v| target.contains(*v)).count();
                let ratio = found as f64 / source.len() as f64;
                (
                    ratio,
                    format!(
                        "{found} of {} sampled source values found in target",
                        source.len()
                    ),
                )
            }
            _ => (0.0, "no sampled values to compare".to_string()),
        }
    }
}

/// Infer cardinality from the two columns' sampled uniqueness.
///
/// One-to-many needs the source clearly less unique than a near-unique
/// target; many-to-many is only ever claimed when both sides profile as
/// low-uniqueness join-table columns. Everything else stays unknown - this
/// is a heuristic, not a guarantee.
fn infer_cardinality(source: &ColumnProfile, target: &ColumnProfile) -> Cardinality {
    if target.unique_ratio >= NEAR_UNIQUE && source.unique_ratio <= WELL_BELOW * target.unique_ratio
    {
        Cardinality::OneToMany
    } else if source.unique_ratio < LOW_UNIQUENESS
        && target.unique_ratio < LOW_UNIQUENESS
        && source.unique_ratio > 0.0
        && target.unique_ratio > 0.0
    {
        Cardinality::ManyToMany
    } else {
        Cardinality::Unknown
    }
}
