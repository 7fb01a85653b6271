//! Column and table profiling over bounded row samples.
//!
//! Type inference attempts progressively stricter parses (integer, decimal,
//! date, boolean, falling back to text) and selects the most specific type
//! for which a configurable fraction of non-null values parses. Ratios are
//! computed over the sample only and documented as estimates - exact
//! computation over tens of millions of rows is out of budget.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisResult, RunReport};

use super::{
    categorize, ColumnProfile, ColumnType, SampleCorpus, SampledTable, TableProfile, TableSample,
};

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // ISO date, optionally with a time component (how SQL Server dumps
        // render datetime columns)
        Regex::new(r"^\d{4}-\d{2}-\d{2}([ T]\d{2}:\d{2}(:\d{2})?(\.\d+)?)?$").unwrap(),
        // Brazilian day-first
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").unwrap(),
        Regex::new(r"^\d{4}/\d{2}/\d{2}$").unwrap(),
    ]
});

static BOOLEAN_TOKENS: &[&str] = &[
    "true",
    "false",
    "t",
    "f",
    "yes",
    "no",
    "y",
    "sim",
    "nao",
    "não",
    "s",
    "n",
    "verdadeiro",
    "falso",
];

fn parses_as_integer(value: &str) -> bool {
    value.parse::<i64>().is_ok()
}

fn parses_as_decimal(value: &str) -> bool {
    // Legacy dumps use the decimal comma; normalize before parsing.
    let normalized = value.replace(',', ".");
    normalized.parse::<f64>().is_ok()
}

fn parses_as_date(value: &str) -> bool {
    DATE_PATTERNS.iter().any(|re| re.is_match(value))
}

fn parses_as_boolean(value: &str) -> bool {
    let lower = value.to_lowercase();
    BOOLEAN_TOKENS.contains(&lower.as_str())
}

/// Infer the most specific type for which at least `threshold` of the
/// non-null values parse. Returns `Unknown` for an empty value set.
fn infer_type(values: &[&str], threshold: f64) -> ColumnType {
    if values.is_empty() {
        return ColumnType::Unknown;
    }

    let total = values.len() as f64;
    let mut integer = 0usize;
    let mut decimal = 0usize;
    let mut date = 0usize;
    let mut boolean = 0usize;

    for value in values {
        let trimmed = value.trim();
        if parses_as_integer(trimmed) {
            integer += 1;
            decimal += 1; // every integer also parses as a decimal
            continue;
        }
        if parses_as_decimal(trimmed) {
            decimal += 1;
            continue;
        }
        if parses_as_date(trimmed) {
            date += 1;
            continue;
        }
        if parses_as_boolean(trimmed) {
            boolean += 1;
        }
    }

    let passes = |count: usize| count as f64 / total >= threshold;
    if passes(integer) {
        ColumnType::Integer
    } else if passes(decimal) {
        ColumnType::Decimal
    } else if passes(date) {
        ColumnType::Date
    } else if passes(boolean) {
        ColumnType::Boolean
    } else {
        ColumnType::Text
    }
}

/// Profile one column from its raw string values.
///
/// Pure function of the sample: an empty or all-null column yields `Unknown`
/// with a zero unique ratio, never an error.
pub fn profile_column<'a>(
    name: &str,
    values: impl Iterator<Item = &'a str>,
    config: &AnalysisConfig,
) -> ColumnProfile {
    let mut total = 0usize;
    let mut nulls = 0usize;
    let mut non_null: Vec<&str> = Vec::new();

    for value in values {
        total += 1;
        if value.trim().is_empty() {
            nulls += 1;
        } else {
            non_null.push(value);
        }
    }

    let mut distinct: HashSet<&str> = HashSet::with_capacity(non_null.len());
    let mut sample_values: Vec<String> = Vec::new();
    for &value in &non_null {
        if distinct.insert(value) && sample_values.len() < config.max_sample_values {
            sample_values.push(value.to_string());
        }
    }

    let null_ratio = if total == 0 {
        0.0
    } else {
        nulls as f64 / total as f64
    };
    // Undefined for all-null columns; treated as 0 for downstream scoring.
    let unique_ratio = if non_null.is_empty() {
        0.0
    } else {
        distinct.len() as f64 / non_null.len() as f64
    };

    let inferred_type = if non_null.is_empty() {
        ColumnType::Unknown
    } else {
        infer_type(&non_null, config.type_parse_fraction)
    };

    let is_candidate_key = !non_null.is_empty()
        && unique_ratio >= config.candidate_key_unique_ratio
        && null_ratio <= config.candidate_key_max_null_ratio;

    ColumnProfile {
        name: name.to_string(),
        inferred_type,
        unique_ratio,
        null_ratio,
        sample_values,
        is_candidate_key,
    }
}

/// Profile one table from its row sample. Pure; does not touch the cache.
pub fn profile_table(sample: &TableSample, config: &AnalysisConfig) -> TableProfile {
    let mut columns = BTreeMap::new();
    for (index, name) in sample.columns.iter().enumerate() {
        let profile = profile_column(name, sample.column_values(index), config);
        columns.insert(name.clone(), profile);
    }

    let sampled_rows = sample.rows.len() as u64;
    let (row_count_estimate, exact_row_count) = match sample.total_rows_hint {
        Some(total) => (total, sampled_rows >= total),
        // No hint: the sample is all we know. If the loader delivered fewer
        // rows than requested, it exhausted the table.
        None => (sampled_rows, sample.rows.len() < config.sample_size),
    };

    TableProfile {
        table_name: sample.table_name.clone(),
        row_count_estimate,
        exact_row_count,
        category: categorize(&sample.table_name, &sample.columns),
        columns,
        column_order: sample.columns.clone(),
        unreadable: false,
    }
}

/// Profiles plus the run report for a profiling pass.
#[derive(Debug, Clone)]
pub struct ProfilingOutcome {
    /// Profile per table, stubs included for unreadable tables.
    pub profiles: BTreeMap<String, TableProfile>,
    /// Per-table failures and ceiling accounting.
    pub report: RunReport,
}

/// Profile every table in the corpus, in parallel.
///
/// Validates the configuration first (fail-fast), applies the table-count
/// ceiling over the corpus's lexicographic ordering, and isolates failures:
/// an unreadable table becomes a stub profile and a report entry, never an
/// error for the run.
pub fn profile_tables(
    corpus: &SampleCorpus,
    config: &AnalysisConfig,
) -> AnalysisResult<ProfilingOutcome> {
    config.validate()?;

    let ceiling = config.max_tables.unwrap_or(usize::MAX);
    let selected: Vec<(&String, &SampledTable)> = corpus.iter().take(ceiling).collect();
    let skipped = corpus.len().saturating_sub(selected.len());

    // Each table reads only its own sample and writes only its own profile,
    // so table-level parallelism needs no coordination.
    let profiled: Vec<(String, TableProfile, Option<String>)> = selected
        .par_iter()
        .map(|(name, sampled)| match sampled {
            SampledTable::Loaded(sample) => {
                ((*name).clone(), profile_table(sample, config), None)
            }
            SampledTable::Unreadable(reason) => (
                (*name).clone(),
                TableProfile::stub((*name).clone()),
                Some(reason.clone()),
            ),
        })
        .collect();

    let mut report = RunReport {
        tables_skipped_by_ceiling: skipped,
        ..RunReport::default()
    };
    let mut profiles = BTreeMap::new();
    for (name, profile, failure) in profiled {
        if let Some(reason) = failure {
            report.record_failure(&name, reason);
        } else {
            report.tables_profiled += 1;
        }
        profiles.insert(name, profile);
    }

    Ok(ProfilingOutcome { profiles, report })
}
