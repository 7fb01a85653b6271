//! Integration tests for conflict resolution and join-path suggestions.

use relmine::config::{AnalysisConfig, ConfidenceTiers};
use relmine::mine::{mine_relationships, ValueSamples};
use relmine::profile::{profile_tables, SampleCorpus, SampledTable, TableSample};

fn sampled(name: &str, columns: &[&str], rows: &[&[&str]]) -> SampledTable {
    SampledTable::Loaded(TableSample::new(
        name,
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect(),
    ))
}

/// Two plausible targets for one column: `Cliente` and `Clientes` both exist
/// (a live table and its legacy twin).
fn ambiguous_corpus() -> SampleCorpus {
    let mut corpus = SampleCorpus::new();
    corpus.insert(
        "Cliente".to_string(),
        sampled("Cliente", &["ID", "Nome"], &[&["1", "Ana"], &["9", "Zoe"]]),
    );
    corpus.insert(
        "Clientes".to_string(),
        sampled(
            "Clientes",
            &["ID", "Nome"],
            &[&["1", "Ana"], &["2", "Bruno"], &["3", "Carla"]],
        ),
    );
    corpus.insert(
        "Pedidos".to_string(),
        sampled(
            "Pedidos",
            &["Numero", "ClienteID"],
            &[&["10", "1"], &["11", "2"], &["12", "3"], &["13", "3"]],
        ),
    );
    corpus
}

fn mine(corpus: &SampleCorpus, config: &AnalysisConfig) -> relmine::RelationshipGraph {
    let outcome = profile_tables(corpus, config).unwrap();
    let values = ValueSamples::from_corpus(corpus);
    mine_relationships(&outcome.profiles, &values, config).unwrap()
}

#[test]
fn conflicting_targets_leave_one_winner_and_keep_losers() {
    let config = AnalysisConfig::default();
    let graph = mine(&ambiguous_corpus(), &config);

    let winners: Vec<_> = graph
        .accepted()
        .iter()
        .filter(|c| c.source_column == "ClienteID")
        .collect();
    assert_eq!(winners.len(), 1);
    // Containment breaks the tie: 1,2,3 all live in Clientes, only 1 in Cliente
    assert_eq!(winners[0].target_table, "Clientes");

    let losers = graph.rejected_for("Pedidos", "ClienteID");
    assert_eq!(losers.len(), 1);
    assert_eq!(losers[0].target_table, "Cliente");
    assert!(losers[0].confidence <= winners[0].confidence);
}

#[test]
fn resolution_is_bit_for_bit_idempotent() {
    let config = AnalysisConfig::default();
    let corpus = ambiguous_corpus();

    let first = serde_json::to_vec(&mine(&corpus, &config)).unwrap();
    let second = serde_json::to_vec(&mine(&corpus, &config)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn records_are_tiered_and_ordered() {
    let config = AnalysisConfig::default();
    let graph = mine(&ambiguous_corpus(), &config);

    let records = graph.to_records(&ConfidenceTiers::default());
    assert!(!records.is_empty());
    let mut keys: Vec<(String, String)> = records
        .iter()
        .map(|r| (r.source_table.clone(), r.source_column.clone()))
        .collect();
    let sorted = {
        let mut s = keys.clone();
        s.sort();
        s
    };
    assert_eq!(keys, sorted);
    keys.dedup();
    assert_eq!(keys.len(), records.len());
    for record in &records {
        assert!(["high", "medium", "low", "noise"].contains(&record.tier.as_str()));
    }
}

#[test]
fn join_paths_cross_a_hub_table() {
    let mut corpus = SampleCorpus::new();
    corpus.insert(
        "Clientes".to_string(),
        sampled("Clientes", &["ID", "Nome"], &[&["1", "Ana"], &["2", "Bia"]]),
    );
    corpus.insert(
        "Produtos".to_string(),
        sampled("Produtos", &["ID", "Descricao"], &[&["7", "Camisa"], &["8", "Bone"]]),
    );
    corpus.insert(
        "Pedidos".to_string(),
        sampled(
            "Pedidos",
            &["Numero", "ClienteID", "ProdutoID"],
            &[&["10", "1", "7"], &["11", "1", "8"], &["12", "2", "7"]],
        ),
    );
    let config = AnalysisConfig::default();
    let graph = mine(&corpus, &config);

    let direct = graph.join_paths("Pedidos", "Clientes");
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].steps.len(), 1);
    assert_eq!(direct[0].steps[0].source_column, "ClienteID");

    let through_hub = graph.join_paths("Clientes", "Produtos");
    assert_eq!(through_hub.len(), 1);
    assert_eq!(
        through_hub[0].tables,
        vec!["Clientes", "Pedidos", "Produtos"]
    );

    assert!(graph.join_paths("Clientes", "Clientes").is_empty());
    assert!(graph.join_paths("Clientes", "Fantasma").is_empty());
}
