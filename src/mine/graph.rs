//! Conflict resolution and the relationship graph.
//!
//! Scored candidates are grouped per (source table, source column); exactly
//! one winner per group is accepted and the rest are kept as rejected
//! alternatives so a reviewer can see what lost and why. The accepted set
//! doubles as an undirected join graph for path suggestions.

use std::collections::BTreeMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::config::ConfidenceTiers;

use super::{Cardinality, Evidence, RelationshipCandidate};

/// Maximum number of intermediate tables in a suggested join path.
const MAX_JOIN_HOPS: usize = 2;

/// The resolved relationship model: one accepted link per source column,
/// plus the alternatives that lost conflict resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipGraph {
    accepted: Vec<RelationshipCandidate>,
    rejected: Vec<RelationshipCandidate>,
}

/// Flat, report-friendly view of an accepted relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub rule: String,
    pub confidence: f64,
    pub cardinality: Cardinality,
    pub tier: String,
    pub self_reference: bool,
    pub evidence: Vec<Evidence>,
}

/// One edge of a suggested join path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinStep {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub confidence: f64,
}

/// A way to join two tables, directly or through one intermediate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPath {
    /// Tables along the path, endpoints included.
    pub tables: Vec<String>,
    pub steps: Vec<JoinStep>,
}

impl RelationshipGraph {
    /// Resolve conflicts among scored candidates.
    ///
    /// Candidates are grouped by (source table, source column). Within each
    /// group the ordering is highest confidence first, ties broken by rule
    /// precedence then target table name, so resolution is deterministic for
    /// a given input set. The first candidate of each group is accepted.
    pub fn resolve(candidates: Vec<RelationshipCandidate>) -> Self {
        let mut groups: BTreeMap<(String, String), Vec<RelationshipCandidate>> = BTreeMap::new();
        for candidate in candidates {
            let key = (candidate.source_table.clone(), candidate.source_column.clone());
            groups.entry(key).or_default().push(candidate);
        }

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for (_, mut group) in groups {
            group.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| a.rule_precedence.cmp(&b.rule_precedence))
                    .then_with(|| a.target_table.cmp(&b.target_table))
            });
            let mut iter = group.into_iter();
            if let Some(winner) = iter.next() {
                accepted.push(winner);
            }
            rejected.extend(iter);
        }

        Self { accepted, rejected }
    }

    /// Accepted relationships, ordered by (source table, source column).
    pub fn accepted(&self) -> &[RelationshipCandidate] {
        &self.accepted
    }

    /// All rejected alternatives across the graph.
    pub fn rejected(&self) -> &[RelationshipCandidate] {
        &self.rejected
    }

    /// Alternatives that lost resolution for one source column, best first.
    pub fn rejected_for(&self, table: &str, column: &str) -> Vec<&RelationshipCandidate> {
        self.rejected
            .iter()
            .filter(|c| c.source_table == table && c.source_column == column)
            .collect()
    }

    /// Flatten the accepted set into labeled records for reporting.
    pub fn to_records(&self, tiers: &ConfidenceTiers) -> Vec<RelationshipRecord> {
        self.accepted
            .iter()
            .map(|c| RelationshipRecord {
                source_table: c.source_table.clone(),
                source_column: c.source_column.clone(),
                target_table: c.target_table.clone(),
                target_column: c.target_column.clone(),
                rule: c.rule.clone(),
                confidence: c.confidence,
                cardinality: c.cardinality,
                tier: tiers.label(c.confidence).to_string(),
                self_reference: c.self_reference,
                evidence: c.evidence.clone(),
            })
            .collect()
    }

    /// Suggest ways to join two tables using accepted relationships only.
    ///
    /// Returns direct joins first, then paths through one intermediate
    /// table, in deterministic order. Self-loops never appear inside a
    /// path.
    pub fn join_paths(&self, from: &str, to: &str) -> Vec<JoinPath> {
        if from == to {
            return Vec::new();
        }

        let (graph, nodes) = self.build_join_graph();
        let (Some(&start), Some(&goal)) = (nodes.get(from), nodes.get(to)) else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        // Direct edges
        for edge in graph.edges(start) {
            let other = if edge.source() == start {
                edge.target()
            } else {
                edge.source()
            };
            if other == goal {
                let candidate = &self.accepted[*edge.weight()];
                paths.push(JoinPath {
                    tables: vec![from.to_string(), to.to_string()],
                    steps: vec![step_of(candidate)],
                });
            }
        }
        // One intermediate hop
        debug_assert!(MAX_JOIN_HOPS >= 2);
        let mut two_hop = Vec::new();
        for first in graph.edges(start) {
            let mid = opposite(&first, start);
            if mid == goal || mid == start {
                continue;
            }
            for second in graph.edges(mid) {
                if opposite(&second, mid) == goal {
                    let a = &self.accepted[*first.weight()];
                    let b = &self.accepted[*second.weight()];
                    two_hop.push(JoinPath {
                        tables: vec![
                            from.to_string(),
                            graph[mid].clone(),
                            to.to_string(),
                        ],
                        steps: vec![step_of(a), step_of(b)],
                    });
                }
            }
        }
        two_hop.sort_by(|a, b| a.tables.cmp(&b.tables));
        two_hop.dedup();
        paths.extend(two_hop);
        paths
    }

    fn build_join_graph(&self) -> (UnGraph<String, usize>, BTreeMap<&str, NodeIndex>) {
        let mut graph = UnGraph::new_undirected();
        let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();
        for (i, candidate) in self.accepted.iter().enumerate() {
            let source = *nodes
                .entry(candidate.source_table.as_str())
                .or_insert_with(|| graph.add_node(candidate.source_table.clone()));
            let target = *nodes
                .entry(candidate.target_table.as_str())
                .or_insert_with(|| graph.add_node(candidate.target_table.clone()));
            if source != target {
                graph.add_edge(source, target, i);
            }
        }
        (graph, nodes)
    }
}

fn opposite<E: EdgeRef<NodeId = NodeIndex>>(edge: &E, from: NodeIndex) -> NodeIndex {
    if edge.source() == from {
        edge.target()
    } else {
        edge.source()
    }
}

fn step_of(candidate: &RelationshipCandidate) -> JoinStep {
    JoinStep {
        source_table: candidate.source_table.clone(),
        source_column: candidate.source_column.clone(),
        target_table: candidate.target_table.clone(),
        target_column: candidate.target_column.clone(),
        confidence: candidate.confidence,
    }
}
