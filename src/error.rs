//! Unified error type and the per-run failure report.
//!
//! Analysis failures are isolated per table: a table whose sample could not
//! be obtained is profiled as a stub and listed in the [`RunReport`], never
//! aborting the rest of the run. Hard errors are reserved for invalid
//! configuration and cache storage problems.

use serde::{Deserialize, Serialize};

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can abort an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A configuration option failed validation. Reported before any
    /// profiling starts, with the offending option named.
    #[error("invalid configuration option '{option}': {reason}")]
    ConfigurationInvalid {
        option: &'static str,
        reason: String,
    },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to determine cache directory")]
    NoCacheDir,
}

/// A table that could not be profiled, with the upstream reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFailure {
    /// Name of the failed table.
    pub table: String,
    /// Why the sample could not be used (e.g. upstream loader error).
    pub reason: String,
}

/// Aggregate report for one analysis run.
///
/// Surfaced alongside the successful profiles/graph so callers can see which
/// tables failed without losing the rest of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of tables that produced a full profile.
    pub tables_profiled: usize,
    /// Number of tables dropped by the table-count ceiling.
    pub tables_skipped_by_ceiling: usize,
    /// Tables that failed, with reasons. These are profiled as stubs and
    /// excluded from candidate generation.
    pub failures: Vec<TableFailure>,
    /// Profiles served from the cache.
    pub profile_cache_hits: usize,
    /// Profiles recomputed on a cache miss.
    pub profile_cache_misses: usize,
    /// Whether the relationship graph was served from the cache.
    pub graph_from_cache: bool,
}

impl RunReport {
    /// Record a failed table.
    pub fn record_failure(&mut self, table: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(TableFailure {
            table: table.into(),
            reason: reason.into(),
        });
    }

    /// True if every sampled table profiled cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
