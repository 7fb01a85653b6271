//! End-to-end tests through the analyzer facade.

use relmine::cache::ProfileCache;
use relmine::config::AnalysisConfig;
use relmine::profile::{SampleCorpus, SampledTable, SourceDescriptor, TableSample};
use relmine::{Cardinality, SchemaAnalyzer};

use std::path::PathBuf;

fn sampled_with_mtime(
    name: &str,
    columns: &[&str],
    rows: &[&[&str]],
    mtime: i64,
) -> SampledTable {
    SampledTable::Loaded(
        TableSample::new(
            name,
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
        .with_source(SourceDescriptor {
            path: PathBuf::from(format!("/data/{}.csv", name.to_lowercase())),
            size_bytes: 4096,
            mtime_unix: mtime,
            content_hash: None,
        }),
    )
}

fn erp_corpus() -> SampleCorpus {
    let mut corpus = SampleCorpus::new();
    corpus.insert(
        "Clientes".to_string(),
        sampled_with_mtime(
            "Clientes",
            &["ID", "Nome"],
            &[&["1", "Ana"], &["2", "Bruno"], &["3", "Carla"]],
            1000,
        ),
    );
    corpus.insert(
        "Pedidos".to_string(),
        sampled_with_mtime(
            "Pedidos",
            &["Numero", "ClienteID"],
            &[&["10", "1"], &["11", "1"], &["12", "2"], &["13", "2"]],
            1000,
        ),
    );
    corpus
}

fn analyzer() -> SchemaAnalyzer {
    SchemaAnalyzer::with_cache(
        AnalysisConfig::default(),
        ProfileCache::open_in_memory().unwrap(),
    )
    .unwrap()
}

#[test]
fn full_run_produces_profiles_graph_and_report() {
    let run = analyzer().analyze(&erp_corpus()).unwrap();

    assert_eq!(run.profiles.len(), 2);
    assert!(run.report.is_clean());
    assert_eq!(run.report.tables_profiled, 2);

    let accepted = run.graph.accepted();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].source_column, "ClienteID");
    assert_eq!(accepted[0].cardinality, Cardinality::OneToMany);
}

#[test]
fn second_run_is_served_from_cache() {
    let analyzer = analyzer();
    let corpus = erp_corpus();

    let cold = analyzer.analyze(&corpus).unwrap();
    assert_eq!(cold.report.profile_cache_hits, 0);
    assert_eq!(cold.report.profile_cache_misses, 2);
    assert!(!cold.report.graph_from_cache);

    let warm = analyzer.analyze(&corpus).unwrap();
    assert_eq!(warm.report.profile_cache_hits, 2);
    assert_eq!(warm.report.profile_cache_misses, 0);
    assert!(warm.report.graph_from_cache);

    // Cached and recomputed results are identical
    assert_eq!(
        serde_json::to_string(&cold.graph).unwrap(),
        serde_json::to_string(&warm.graph).unwrap()
    );
}

#[test]
fn touching_one_file_recomputes_only_that_profile() {
    let analyzer = analyzer();
    let mut corpus = erp_corpus();
    analyzer.analyze(&corpus).unwrap();

    corpus.insert(
        "Pedidos".to_string(),
        sampled_with_mtime(
            "Pedidos",
            &["Numero", "ClienteID"],
            &[&["10", "1"], &["11", "1"], &["12", "2"], &["13", "2"]],
            2000,
        ),
    );

    let run = analyzer.analyze(&corpus).unwrap();
    assert_eq!(run.report.profile_cache_hits, 1);
    assert_eq!(run.report.profile_cache_misses, 1);
    // Any changed table invalidates the whole graph
    assert!(!run.report.graph_from_cache);
}

#[test]
fn records_expose_tiers_and_evidence() {
    let config = AnalysisConfig::default();
    let run = analyzer().analyze(&erp_corpus()).unwrap();

    let records = run.records(&config);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.tier, "high");
    assert_eq!(record.evidence.len(), 4);
    assert!(record.confidence > 0.9);
}

#[test]
fn ceiling_applies_before_profiling_and_mining() {
    let config = AnalysisConfig {
        max_tables: Some(1),
        ..AnalysisConfig::default()
    };
    let analyzer =
        SchemaAnalyzer::with_cache(config, ProfileCache::open_in_memory().unwrap()).unwrap();

    let run = analyzer.analyze(&erp_corpus()).unwrap();
    // Lexicographic first table only: Clientes
    assert_eq!(run.profiles.len(), 1);
    assert!(run.profiles.contains_key("Clientes"));
    assert_eq!(run.report.tables_skipped_by_ceiling, 1);
    assert!(run.graph.accepted().is_empty());
}

#[test]
fn unreadable_table_does_not_abort_the_run() {
    let analyzer = analyzer();
    let mut corpus = erp_corpus();
    corpus.insert(
        "Estoque".to_string(),
        SampledTable::Unreadable("mdb export failed".to_string()),
    );

    let run = analyzer.analyze(&corpus).unwrap();
    assert_eq!(run.report.failures.len(), 1);
    assert_eq!(run.report.failures[0].table, "Estoque");
    assert!(run.profiles["Estoque"].unreadable);
    assert_eq!(run.graph.accepted().len(), 1);
}
