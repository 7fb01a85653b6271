//! Table and column profiling.
//!
//! A profile is a structural signature derived from a bounded row sample:
//! per-column inferred type, uniqueness and null ratios, a handful of sample
//! values, and a coarse domain category for the table. All statistics are
//! defined over the sample; when the sample covers the whole table they are
//! exact as the degenerate case.
//!
//! Profiles are immutable once computed and replaced wholesale on
//! re-analysis, never mutated in place.

mod category;
mod profiler;

pub use category::categorize;
pub use profiler::{profile_column, profile_table, profile_tables, ProfilingOutcome};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Inferred type of a column, from most to least specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Decimal,
    Date,
    Boolean,
    Text,
    /// Empty or all-null column, or no type reached the parse threshold.
    Unknown,
}

impl ColumnType {
    /// Whether this type is numeric (integer or decimal).
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    /// Compatibility of two column types for a foreign-key link, in [0, 1].
    ///
    /// Exact matches score 1.0; numeric-vs-numeric mismatches get partial
    /// credit; an unknown side is weak but not disqualifying, because legacy
    /// dumps are full of sparsely populated key columns.
    pub fn compatibility(self, other: Self) -> f64 {
        if self == other && self != Self::Unknown {
            1.0
        } else if self.is_numeric() && other.is_numeric() {
            0.7
        } else if self == Self::Unknown || other == Self::Unknown {
            0.3
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Decimal => write!(f, "decimal"),
            Self::Date => write!(f, "date"),
            Self::Boolean => write!(f, "boolean"),
            Self::Text => write!(f, "text"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Structural profile of one column, computed from a bounded sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name as it appeared in the input.
    pub name: String,
    /// Inferred type.
    pub inferred_type: ColumnType,
    /// Fraction of sampled non-null values that are distinct (0-1).
    /// An estimate; 0.0 for an empty or all-null column.
    pub unique_ratio: f64,
    /// Fraction of sampled values that are null (0-1).
    pub null_ratio: f64,
    /// Bounded, ordered, deduplicated sample of non-null values.
    pub sample_values: Vec<String>,
    /// Whether this column looks like a key: near-unique and mostly non-null.
    pub is_candidate_key: bool,
}

/// Coarse domain category of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableCategory {
    Customers,
    Products,
    Sales,
    Inventory,
    Other,
}

impl std::fmt::Display for TableCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customers => write!(f, "customers"),
            Self::Products => write!(f, "products"),
            Self::Sales => write!(f, "sales"),
            Self::Inventory => write!(f, "inventory"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structural profile of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    /// Table name.
    pub table_name: String,
    /// Row count: exact when the sample covered the table, otherwise the
    /// loader's total-row hint (or the sample size as a floor).
    pub row_count_estimate: u64,
    /// Whether `row_count_estimate` is exact.
    pub exact_row_count: bool,
    /// Column profiles, keyed by the input column names.
    pub columns: BTreeMap<String, ColumnProfile>,
    /// Input column order, for display and deterministic iteration.
    pub column_order: Vec<String>,
    /// Coarse domain category.
    pub category: TableCategory,
    /// True for the minimal stub produced when a sample was unreadable.
    /// Stubs are excluded from candidate generation.
    pub unreadable: bool,
}

impl TableProfile {
    /// Minimal stub for a table whose sample could not be obtained.
    pub fn stub(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            row_count_estimate: 0,
            exact_row_count: false,
            columns: BTreeMap::new(),
            column_order: Vec::new(),
            category: TableCategory::Other,
            unreadable: true,
        }
    }

    /// Look up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.get(name)
    }

    /// Columns in input order.
    pub fn columns_in_order(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.column_order
            .iter()
            .filter_map(move |name| self.columns.get(name))
    }

    /// The column most likely to be this table's key: first candidate key in
    /// input order, else the most-unique column.
    pub fn key_column(&self) -> Option<&ColumnProfile> {
        self.columns_in_order()
            .find(|c| c.is_candidate_key)
            .or_else(|| {
                self.columns_in_order().max_by(|a, b| {
                    a.unique_ratio
                        .partial_cmp(&b.unique_ratio)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            })
    }
}

/// Identity of the file a sample was drawn from, used for cache fingerprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Path of the source file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Modification time as unix seconds.
    pub mtime_unix: i64,
    /// Content hash, when the loader computed one. Takes precedence over
    /// size+mtime in the fingerprint.
    pub content_hash: Option<String>,
}

/// A bounded row sample for one table, as delivered by the upstream loader.
///
/// Empty cells are nulls. The engine never reads the underlying files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSample {
    /// Table name.
    pub table_name: String,
    /// Column headers, in file order.
    pub columns: Vec<String>,
    /// Sampled rows; each row has one cell per column.
    pub rows: Vec<Vec<String>>,
    /// Total row count of the underlying table, if the loader knows it.
    pub total_rows_hint: Option<u64>,
    /// Source file identity for fingerprinting.
    pub source: Option<SourceDescriptor>,
}

impl TableSample {
    /// Build a sample from headers and rows, with no source metadata.
    pub fn new(
        table_name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            rows,
            total_rows_hint: None,
            source: None,
        }
    }

    /// Set the loader's total row count.
    pub fn with_total_rows(mut self, total: u64) -> Self {
        self.total_rows_hint = Some(total);
        self
    }

    /// Attach the source file descriptor.
    pub fn with_source(mut self, source: SourceDescriptor) -> Self {
        self.source = Some(source);
        self
    }

    /// Values of one column across the sampled rows, by column index.
    pub(crate) fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| {
            row.get(index).map(String::as_str).unwrap_or("")
        })
    }
}

/// Outcome of sampling one table: either rows, or the upstream failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SampledTable {
    /// Sample obtained.
    Loaded(TableSample),
    /// Sample could not be obtained; carries the loader's reason.
    Unreadable(String),
}

/// The full input snapshot: table name to sample outcome.
///
/// A `BTreeMap` so iteration order is lexicographic by table name, which is
/// the documented ordering for the table-count ceiling.
pub type SampleCorpus = BTreeMap<String, SampledTable>;

/// Group profiled tables by category, stubs included under Other.
pub fn tables_by_category<'a>(
    profiles: &'a BTreeMap<String, TableProfile>,
) -> BTreeMap<TableCategory, Vec<&'a str>> {
    let mut groups: BTreeMap<TableCategory, Vec<&str>> = BTreeMap::new();
    for profile in profiles.values() {
        groups
            .entry(profile.category)
            .or_default()
            .push(profile.table_name.as_str());
    }
    groups
}
