//! Relationship mining over profiled tables.
//!
//! The mining pipeline is strictly phased:
//!
//! ```text
//!   profiles ──► NameIndex::build          (barrier: index covers all tables)
//!            ──► CandidateGenerator        (names only)
//!            ──► EvidenceScorer            (profiles + sampled values)
//!            ──► RelationshipGraph::resolve (one winner per source column)
//! ```
//!
//! Candidate generation never reads values and scoring never invents
//! candidates, so each phase is testable in isolation and the whole run is
//! deterministic for a given corpus and configuration.

pub mod candidates;
pub mod graph;
pub mod inflection;
pub mod name_index;
pub mod rules;
pub mod scoring;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisResult;
use crate::profile::{SampleCorpus, SampledTable, TableProfile};

pub use candidates::{CandidateGenerator, CandidateSkeleton};
pub use graph::{JoinPath, JoinStep, RelationshipGraph, RelationshipRecord};
pub use name_index::NameIndex;
pub use rules::{default_rules, AliasTable, NamingRule};
pub use scoring::{EvidenceScorer, FACTOR_COUNT};

/// Version of the rule library and scoring model. Bumped whenever rules,
/// strengths, or the evidence factors change shape, so cached graphs from
/// older models are never reused.
pub const RULE_LIBRARY_VERSION: u32 = 1;

/// Direction-aware cardinality of a relationship, read source to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Many source rows reference one target row.
    OneToMany,
    /// Both columns look like join-table sides.
    ManyToMany,
    /// Samples were inconclusive.
    Unknown,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneToMany => write!(f, "1:N"),
            Self::ManyToMany => write!(f, "N:M"),
            Self::Unknown => write!(f, "?"),
        }
    }
}

/// One factor's contribution to a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Factor identifier (`naming`, `type_compatibility`, ...).
    pub factor: String,
    /// Raw factor value in [0, 1], before weighting.
    pub raw: f64,
    /// Configured weight of this factor.
    pub weight: f64,
    /// Normalized contribution to the final score.
    pub contribution: f64,
    /// Human-readable explanation of the raw value.
    pub detail: String,
}

/// A scored candidate relationship, before conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    /// Naming rule that proposed the link.
    pub rule: String,
    pub rule_precedence: u8,
    pub self_reference: bool,
    pub cardinality: Cardinality,
    /// Weighted evidence score in [0, 1].
    pub confidence: f64,
    /// One entry per scoring factor, in factor order.
    pub evidence: Vec<Evidence>,
}

/// Sampled distinct values per (table, column), used for containment checks.
///
/// Built from the same sample the profiler saw. Missing entries (unreadable
/// tables, columns beyond the header) score zero containment rather than
/// failing.
#[derive(Debug, Default)]
pub struct ValueSamples {
    columns: HashMap<(String, String), HashSet<String>>,
}

impl ValueSamples {
    /// Collect distinct non-null values for every column of every readable
    /// table in the corpus.
    pub fn from_corpus(corpus: &SampleCorpus) -> Self {
        Self::from_tables(corpus.iter())
    }

    /// Same as [`ValueSamples::from_corpus`], over any subset of tables.
    pub fn from_tables<'a>(
        tables: impl IntoIterator<Item = (&'a String, &'a SampledTable)>,
    ) -> Self {
        let mut columns = HashMap::new();
        for (name, table) in tables {
            let SampledTable::Loaded(sample) = table else {
                continue;
            };
            for (i, column) in sample.columns.iter().enumerate() {
                let values: HashSet<String> = sample
                    .column_values(i)
                    .into_iter()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| v.trim().to_string())
                    .collect();
                columns.insert((name.clone(), column.clone()), values);
            }
        }
        Self { columns }
    }

    /// Distinct sampled values of one column, if the column was sampled.
    pub fn get(&self, table: &str, column: &str) -> Option<&HashSet<String>> {
        self.columns
            .get(&(table.to_string(), column.to_string()))
    }
}

/// Run the full mining pipeline over profiled tables.
pub fn mine_relationships(
    profiles: &BTreeMap<String, TableProfile>,
    values: &ValueSamples,
    config: &AnalysisConfig,
) -> AnalysisResult<RelationshipGraph> {
    config.validate()?;

    let index = NameIndex::build(profiles.keys().map(String::as_str));
    let generator = CandidateGenerator::new(&index, profiles, config);
    let scorer = EvidenceScorer::new(config, profiles, values);

    let candidates = generator
        .generate()
        .into_iter()
        .filter_map(|skeleton| scorer.score(skeleton))
        .collect();

    Ok(RelationshipGraph::resolve(candidates))
}
