//! Content fingerprints for cache keys.
//!
//! A table's fingerprint changes whenever its source data or any
//! analysis-relevant configuration changes, and only then. The whole-graph
//! fingerprint folds every table fingerprint together plus the rule-library
//! version, so one changed table invalidates the graph while leaving the
//! other tables' profile entries valid.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::{AnalysisConfig, ScoringWeights};
use crate::error::AnalysisResult;
use crate::mine::RULE_LIBRARY_VERSION;
use crate::profile::{SampledTable, TableSample};

/// Compute the SHA256 hash of a serializable value.
///
/// The value is serialized to JSON before hashing, ensuring deterministic
/// output. Returns a 64-character lowercase hexadecimal string.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// The configuration subset that affects analysis results.
///
/// Presentation options (tiers, cache settings) are deliberately excluded:
/// changing how results are displayed must not invalidate them.
#[derive(Debug, Serialize)]
struct ConfigDigest<'a> {
    sample_size: usize,
    min_confidence: f64,
    type_parse_fraction: f64,
    candidate_key_unique_ratio: f64,
    candidate_key_max_null_ratio: f64,
    max_sample_values: usize,
    weights: &'a ScoringWeights,
    aliases: &'a std::collections::BTreeMap<String, Vec<String>>,
    rule_library_version: u32,
}

impl<'a> ConfigDigest<'a> {
    fn of(config: &'a AnalysisConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            min_confidence: config.min_confidence,
            type_parse_fraction: config.type_parse_fraction,
            candidate_key_unique_ratio: config.candidate_key_unique_ratio,
            candidate_key_max_null_ratio: config.candidate_key_max_null_ratio,
            max_sample_values: config.max_sample_values,
            weights: &config.weights,
            aliases: &config.aliases,
            rule_library_version: RULE_LIBRARY_VERSION,
        }
    }
}

/// Identity of a table's source data, cheapest available form first.
#[derive(Debug, Serialize)]
enum SourceIdentity<'a> {
    ContentHash(&'a str),
    SizeAndMtime { size: u64, mtime: i64 },
    /// No source metadata: fall back to hashing the sample itself.
    SampleContent(&'a TableSample),
    Unreadable(&'a str),
}

fn source_identity(table: &SampledTable) -> SourceIdentity<'_> {
    match table {
        SampledTable::Loaded(sample) => match &sample.source {
            Some(source) => match &source.content_hash {
                Some(hash) => SourceIdentity::ContentHash(hash),
                None => SourceIdentity::SizeAndMtime {
                    size: source.size_bytes,
                    mtime: source.mtime_unix,
                },
            },
            None => SourceIdentity::SampleContent(sample),
        },
        SampledTable::Unreadable(reason) => SourceIdentity::Unreadable(reason),
    }
}

/// Fingerprint of one table's sample under a given configuration.
pub fn table_fingerprint(
    name: &str,
    table: &SampledTable,
    config: &AnalysisConfig,
) -> AnalysisResult<String> {
    let digest = (name, source_identity(table), ConfigDigest::of(config));
    Ok(compute_hash(&digest)?)
}

/// Fingerprint of the whole corpus, for the relationship graph entry.
///
/// Takes the per-table fingerprints in a deterministic order, so the result
/// is independent of profiling concurrency.
pub fn graph_fingerprint(
    table_fingerprints: &std::collections::BTreeMap<String, String>,
    config: &AnalysisConfig,
) -> AnalysisResult<String> {
    let digest = (table_fingerprints, ConfigDigest::of(config));
    Ok(compute_hash(&digest)?)
}
