//! # Relmine
//!
//! Reconstructs the implicit relational model of a legacy database from
//! sampled table dumps.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           SampleCorpus (bounded row samples)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [profile]
//! ┌─────────────────────────────────────────────────────────┐
//! │     TableProfile (types, uniqueness, nulls, category)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [mine: name index + rule library]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Candidates (naming matches, unscored)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [mine: evidence scoring]
//! ┌─────────────────────────────────────────────────────────┐
//! │   RelationshipGraph (one winner per column + rejected)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`analyzer::SchemaAnalyzer`] drives the whole pipeline and serves
//! unchanged work from a fingerprint-keyed SQLite cache in [`cache`].

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod mine;
pub mod profile;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analyzer::{AnalysisRun, SchemaAnalyzer};
    pub use crate::cache::ProfileCache;
    pub use crate::config::{AnalysisConfig, ConfidenceTier, ConfidenceTiers, ScoringWeights};
    pub use crate::error::{AnalysisError, AnalysisResult, RunReport, TableFailure};
    pub use crate::mine::{
        Cardinality, Evidence, JoinPath, RelationshipCandidate, RelationshipGraph,
        RelationshipRecord,
    };
    pub use crate::profile::{
        ColumnProfile, ColumnType, SampleCorpus, SampledTable, TableCategory, TableProfile,
        TableSample,
    };
}

// Also export at crate root for convenience
pub use analyzer::{AnalysisRun, SchemaAnalyzer};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult, RunReport};
pub use mine::{Cardinality, RelationshipGraph, RelationshipRecord};
pub use profile::{SampleCorpus, SampledTable, TableProfile, TableSample};
