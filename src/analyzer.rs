//! The top-level analysis facade.
//!
//! [`SchemaAnalyzer`] ties the phases together: apply the table ceiling,
//! profile each table (serving unchanged tables from the cache), then mine
//! the relationship graph (served whole from the cache when no table
//! changed). Cache reads never fail a run; a corrupt or missing entry is a
//! miss and the work is redone.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::cache::{graph_fingerprint, table_fingerprint, ProfileCache};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisResult, RunReport};
use crate::mine::{mine_relationships, RelationshipGraph, RelationshipRecord, ValueSamples};
use crate::profile::{profile_table, SampleCorpus, SampledTable, TableProfile};

/// Everything one analysis run produces.
#[derive(Debug)]
pub struct AnalysisRun {
    /// Profile per analyzed table, stubs included for unreadable tables.
    pub profiles: BTreeMap<String, TableProfile>,
    /// The resolved relationship graph.
    pub graph: RelationshipGraph,
    /// Failures, ceiling accounting, and cache statistics for the run.
    pub report: RunReport,
}

impl AnalysisRun {
    /// Accepted relationships as flat, tier-labeled records.
    pub fn records(&self, config: &AnalysisConfig) -> Vec<RelationshipRecord> {
        self.graph.to_records(&config.tiers)
    }
}

/// Profiles a corpus and mines its relationship graph, caching both.
pub struct SchemaAnalyzer {
    config: AnalysisConfig,
    cache: Option<ProfileCache>,
}

impl SchemaAnalyzer {
    /// Create an analyzer, opening the cache when configured.
    ///
    /// Fails fast on an invalid configuration or an unopenable cache
    /// database.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let cache = if config.cache.enabled {
            Some(ProfileCache::open(config.cache.path.clone())?)
        } else {
            None
        };
        Ok(Self { config, cache })
    }

    /// Create an analyzer that never touches a cache.
    pub fn without_cache(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: None,
        })
    }

    /// Create an analyzer over an explicit cache handle (used by tests to
    /// run against an in-memory database).
    pub fn with_cache(config: AnalysisConfig, cache: ProfileCache) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: Some(cache),
        })
    }

    /// The analyzer's configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full analysis over a sampled corpus.
    pub fn analyze(&self, corpus: &SampleCorpus) -> AnalysisResult<AnalysisRun> {
        let ceiling = self.config.max_tables.unwrap_or(usize::MAX);
        let selected: Vec<(&String, &SampledTable)> = corpus.iter().take(ceiling).collect();

        let mut report = RunReport {
            tables_skipped_by_ceiling: corpus.len().saturating_sub(selected.len()),
            ..RunReport::default()
        };

        // Fingerprint every selected table up front; the same fingerprints
        // key the profile cache and feed the graph fingerprint.
        let mut fingerprints: BTreeMap<String, String> = BTreeMap::new();
        for (name, table) in &selected {
            let fp = table_fingerprint(name, table, &self.config)?;
            fingerprints.insert((*name).to_string(), fp);
        }

        let mut profiles: BTreeMap<String, TableProfile> = BTreeMap::new();
        let mut miss_samples: Vec<(&String, &SampledTable)> = Vec::new();

        for (name, table) in &selected {
            match table {
                SampledTable::Unreadable(reason) => {
                    report.record_failure(*name, reason.clone());
                    profiles.insert((*name).clone(), TableProfile::stub((*name).clone()));
                }
                SampledTable::Loaded(_) => {
                    let fp = &fingerprints[*name];
                    if let Some(cached) = self.cache.as_ref().and_then(|c| c.get_profile(fp)) {
                        report.profile_cache_hits += 1;
                        report.tables_profiled += 1;
                        profiles.insert((*name).clone(), cached);
                    } else {
                        miss_samples.push((*name, *table));
                    }
                }
            }
        }

        // Profile the misses in parallel; each table is independent.
        let config = &self.config;
        let computed: Vec<(String, TableProfile)> = miss_samples
            .par_iter()
            .filter_map(|(name, table)| match table {
                SampledTable::Loaded(sample) => {
                    Some(((*name).clone(), profile_table(sample, config)))
                }
                SampledTable::Unreadable(_) => None,
            })
            .collect();

        for (name, profile) in computed {
            report.profile_cache_misses += 1;
            report.tables_profiled += 1;
            if let Some(cache) = &self.cache {
                cache.put_profile(&fingerprints[&name], &profile)?;
            }
            profiles.insert(name, profile);
        }

        // The graph entry is keyed over every table fingerprint: one changed
        // table invalidates the graph but not the other tables' profiles.
        let graph_fp = graph_fingerprint(&fingerprints, &self.config)?;
        let graph = match self.cache.as_ref().and_then(|c| c.get_graph(&graph_fp)) {
            Some(cached) => {
                report.graph_from_cache = true;
                cached
            }
            None => {
                let values = ValueSamples::from_tables(selected.iter().copied());
                let graph = mine_relationships(&profiles, &values, &self.config)?;
                if let Some(cache) = &self.cache {
                    cache.put_graph(&graph_fp, &graph)?;
                }
                graph
            }
        };

        Ok(AnalysisRun {
            profiles,
            graph,
            report,
        })
    }
}
