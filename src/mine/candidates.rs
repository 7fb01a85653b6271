//! Candidate generation from names alone.
//!
//! Proposes (source column → target table) links by running the ordered rule
//! library over every column and resolving the extracted entity tokens
//! through the name index. No values are inspected here; skeletons carry
//! only the naming evidence for the scorer to validate.

use std::collections::{BTreeMap, HashMap};

use crate::config::AnalysisConfig;
use crate::profile::TableProfile;

use super::name_index::NameIndex;
use super::rules::{default_rules, AliasTable, NamingRule};

/// An unscored candidate link: the naming match, before any value evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSkeleton {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    /// The highest-precedence rule that proposed this pair.
    pub rule: &'static str,
    /// Precedence of that rule (lower wins ties downstream).
    pub rule_precedence: u8,
    /// Naming-strength factor from that rule.
    pub naming_strength: f64,
    /// Column references its own table. Flagged, never filtered.
    pub self_reference: bool,
}

/// Generates candidate skeletons for a profiled corpus.
pub struct CandidateGenerator<'a> {
    index: &'a NameIndex,
    profiles: &'a BTreeMap<String, TableProfile>,
    rules: Vec<NamingRule>,
    aliases: AliasTable,
}

impl<'a> CandidateGenerator<'a> {
    /// Create a generator over a fully built name index.
    ///
    /// The index must cover every table in `profiles`; building it is the
    /// synchronization barrier between the profiling and mining phases.
    pub fn new(
        index: &'a NameIndex,
        profiles: &'a BTreeMap<String, TableProfile>,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            index,
            profiles,
            rules: default_rules(),
            aliases: AliasTable::with_defaults(&config.aliases),
        }
    }

    /// Generate skeletons for every column of every readable table.
    ///
    /// Per (column, target) pair only the highest-precedence proposing rule
    /// is kept; multiple targets for one column all survive, to be resolved
    /// by the relationship graph after scoring.
    pub fn generate(&self) -> Vec<CandidateSkeleton> {
        let mut skeletons = Vec::new();
        for profile in self.profiles.values() {
            if profile.unreadable {
                continue;
            }
            self.candidates_for_table(profile, &mut skeletons);
        }
        skeletons
    }

    fn candidates_for_table(&self, profile: &TableProfile, out: &mut Vec<CandidateSkeleton>) {
        for column in profile.columns_in_order() {
            // (target table) -> best skeleton for this column
            let mut best: HashMap<String, CandidateSkeleton> = HashMap::new();

            for rule in &self.rules {
                for token in rule.extract(&column.name, &self.aliases) {
                    for expanded in self.aliases.expand(&token) {
                        for target in self.index.lookup_inflected(&expanded) {
                            let Some(target_profile) = self.profiles.get(target) else {
                                continue;
                            };
                            if target_profile.unreadable {
                                continue;
                            }
                            let Some(target_column) = target_profile.key_column() else {
                                continue;
                            };
                            best.entry(target.to_string()).or_insert_with(|| {
                                CandidateSkeleton {
                                    source_table: profile.table_name.clone(),
                                    source_column: column.name.clone(),
                                    target_table: target.to_string(),
                                    target_column: target_column.name.clone(),
                                    rule: rule.name,
                                    rule_precedence: rule.precedence,
                                    naming_strength: rule.strength,
                                    self_reference: target == profile.table_name,
                                }
                            });
                        }
                    }
                }
            }

            // Deterministic output order: by target table name
            let mut found: Vec<CandidateSkeleton> = best.into_values().collect();
            found.sort_by(|a, b| a.target_table.cmp(&b.target_table));
            out.extend(found);
        }
    }
}
