//! TOML-based configuration for an analysis run.
//!
//! Supports a config file (relmine.toml) with sensible defaults for every
//! option, so an empty file (or none at all) is a valid configuration.
//!
//! Example configuration:
//! ```toml
//! sample_size = 5000
//! min_confidence = 0.1
//! max_tables = 200
//!
//! [weights]
//! naming = 0.30
//! type_compatibility = 0.15
//! target_uniqueness = 0.25
//! value_overlap = 0.30
//!
//! [aliases]
//! cliente = ["customer"]
//! faccao = ["subcontractor"]
//!
//! [cache]
//! enabled = true
//! path = "/tmp/relmine-cache.db"
//! ```
//!
//! Validation is fail-fast: [`AnalysisConfig::validate`] runs before any
//! profiling and names the offending option.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Weights for the evidence factors combined into a confidence score.
///
/// The score is a weighted sum normalized by the weight total, so the
/// absolute scale of the weights does not matter - only their ratios do.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the naming-rule strength factor.
    pub naming: f64,
    /// Weight of the source/target type compatibility factor.
    pub type_compatibility: f64,
    /// Weight of the target column uniqueness factor.
    pub target_uniqueness: f64,
    /// Weight of the sampled value containment factor.
    pub value_overlap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            naming: 0.30,
            type_compatibility: 0.15,
            target_uniqueness: 0.25,
            value_overlap: 0.30,
        }
    }
}

impl ScoringWeights {
    /// Sum of all factor weights.
    pub fn total(&self) -> f64 {
        self.naming + self.type_compatibility + self.target_uniqueness + self.value_overlap
    }
}

/// Display tier for a confidence score.
///
/// Tiers are a labeling convenience for consumers (dashboards, exports) and
/// never influence mining itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    Noise,
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Noise => write!(f, "noise"),
        }
    }
}

/// Cutoffs for the three-tier confidence display.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfidenceTiers {
    /// Scores at or above this are labeled high.
    pub high: f64,
    /// Scores at or above this (and below `high`) are labeled medium.
    pub medium: f64,
    /// Scores at or above this (and below `medium`) are labeled low.
    pub low: f64,
}

impl Default for ConfidenceTiers {
    fn default() -> Self {
        Self {
            high: 0.95,
            medium: 0.72,
            low: 0.30,
        }
    }
}

impl ConfidenceTiers {
    /// Label a confidence score.
    pub fn label(&self, confidence: f64) -> ConfidenceTier {
        if confidence >= self.high {
            ConfidenceTier::High
        } else if confidence >= self.medium {
            ConfidenceTier::Medium
        } else if confidence >= self.low {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::Noise
        }
    }
}

/// Profile/graph cache settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Whether results are cached between runs.
    pub enabled: bool,
    /// Cache database location. Defaults to `~/.relmine/cache.db`.
    pub path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows sampled per table. Statistics are estimates over this sample;
    /// exact computation is the degenerate case where the sample covers the
    /// whole table.
    pub sample_size: usize,

    /// Minimum confidence for a candidate to be retained at all. Kept low by
    /// default so filtering stays a presentation concern.
    pub min_confidence: f64,

    /// Fraction of non-null sampled values that must parse for a type to be
    /// selected during inference.
    pub type_parse_fraction: f64,

    /// Minimum unique ratio for a column to count as a candidate key.
    pub candidate_key_unique_ratio: f64,

    /// Maximum null ratio for a column to count as a candidate key.
    pub candidate_key_max_null_ratio: f64,

    /// Distinct sample values retained per column profile.
    pub max_sample_values: usize,

    /// Ceiling on the number of tables analyzed. Tables are taken in
    /// lexicographic name order, first N. `None` means no ceiling.
    pub max_tables: Option<usize>,

    /// Evidence factor weights.
    pub weights: ScoringWeights,

    /// Extra naming aliases, merged over the built-in ERP synonym table.
    /// Keys are canonical entity names, values their synonyms.
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Confidence display tiers.
    pub tiers: ConfidenceTiers,

    /// Cache settings.
    pub cache: CacheSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_size: 2000,
            min_confidence: 0.10,
            type_parse_fraction: 0.95,
            candidate_key_unique_ratio: 0.95,
            candidate_key_max_null_ratio: 0.05,
            max_sample_values: 20,
            max_tables: None,
            weights: ScoringWeights::default(),
            aliases: BTreeMap::new(),
            tiers: ConfidenceTiers::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> AnalysisResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, naming the offending option on failure.
    ///
    /// Runs before any profiling starts so bad configurations are rejected
    /// early and cheaply.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.sample_size == 0 {
            return Err(invalid("sample_size", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid("min_confidence", "must be within [0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&self.type_parse_fraction) || self.type_parse_fraction == 0.0 {
            return Err(invalid("type_parse_fraction", "must be within (0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&self.candidate_key_unique_ratio) {
            return Err(invalid(
                "candidate_key_unique_ratio",
                "must be within [0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&self.candidate_key_max_null_ratio) {
            return Err(invalid(
                "candidate_key_max_null_ratio",
                "must be within [0.0, 1.0]",
            ));
        }
        if self.max_sample_values == 0 {
            return Err(invalid("max_sample_values", "must be at least 1"));
        }
        if self.max_tables == Some(0) {
            return Err(invalid("max_tables", "must be at least 1 when set"));
        }

        let w = &self.weights;
        for (name, value) in [
            ("weights.naming", w.naming),
            ("weights.type_compatibility", w.type_compatibility),
            ("weights.target_uniqueness", w.target_uniqueness),
            ("weights.value_overlap", w.value_overlap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(name, "must be a non-negative number"));
            }
        }
        if w.total() <= 0.0 {
            return Err(invalid("weights", "must sum to a positive value"));
        }

        let t = &self.tiers;
        if !(t.low <= t.medium && t.medium <= t.high && (0.0..=1.0).contains(&t.high)) {
            return Err(invalid(
                "tiers",
                "cutoffs must satisfy 0 <= low <= medium <= high <= 1",
            ));
        }

        Ok(())
    }
}

fn invalid(option: &'static str, reason: &str) -> AnalysisError {
    AnalysisError::ConfigurationInvalid {
        option,
        reason: reason.to_string(),
    }
}
