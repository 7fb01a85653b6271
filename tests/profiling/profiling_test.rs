//! Integration tests for table profiling.

use relmine::config::AnalysisConfig;
use relmine::profile::{profile_tables, ColumnType, SampleCorpus, SampledTable, TableSample};

fn sampled(name: &str, columns: &[&str], rows: &[&[&str]]) -> SampledTable {
    SampledTable::Loaded(TableSample::new(
        name,
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect(),
    ))
}

fn erp_corpus() -> SampleCorpus {
    let mut corpus = SampleCorpus::new();
    corpus.insert(
        "Clientes".to_string(),
        sampled(
            "Clientes",
            &["ID", "Nome", "Cidade", "DataCadastro", "Ativo"],
            &[
                &["1", "Ana Souza", "Recife", "2020-03-15", "S"],
                &["2", "Bruno Lima", "Olinda", "2021-07-02", "S"],
                &["3", "Carla Dias", "Recife", "2019-11-30", "N"],
            ],
        ),
    );
    corpus.insert(
        "Pedidos".to_string(),
        sampled(
            "Pedidos",
            &["Numero", "ClienteID", "ValorTotal", "DataPedido"],
            &[
                &["1001", "1", "150,00", "2023-01-05"],
                &["1002", "1", "89,90", "2023-01-06"],
                &["1003", "2", "310,50", "2023-01-08"],
                &["1004", "3", "45,00", "2023-01-09"],
            ],
        ),
    );
    corpus
}

#[test]
fn profile_keys_match_input_column_names() {
    let outcome = profile_tables(&erp_corpus(), &AnalysisConfig::default()).unwrap();

    let clientes = &outcome.profiles["Clientes"];
    let mut expected = vec!["ID", "Nome", "Cidade", "DataCadastro", "Ativo"];
    assert_eq!(clientes.column_order, expected);
    expected.sort();
    let keys: Vec<&str> = clientes.columns.keys().map(String::as_str).collect();
    assert_eq!(keys, expected);
}

#[test]
fn types_inferred_across_a_realistic_dump() {
    let outcome = profile_tables(&erp_corpus(), &AnalysisConfig::default()).unwrap();

    let clientes = &outcome.profiles["Clientes"];
    assert_eq!(clientes.column("ID").unwrap().inferred_type, ColumnType::Integer);
    assert_eq!(clientes.column("Nome").unwrap().inferred_type, ColumnType::Text);
    assert_eq!(
        clientes.column("DataCadastro").unwrap().inferred_type,
        ColumnType::Date
    );
    assert_eq!(
        clientes.column("Ativo").unwrap().inferred_type,
        ColumnType::Boolean
    );

    let pedidos = &outcome.profiles["Pedidos"];
    // Decimal-comma amounts
    assert_eq!(
        pedidos.column("ValorTotal").unwrap().inferred_type,
        ColumnType::Decimal
    );
}

#[test]
fn key_column_detection() {
    let outcome = profile_tables(&erp_corpus(), &AnalysisConfig::default()).unwrap();

    let clientes = &outcome.profiles["Clientes"];
    assert!(clientes.column("ID").unwrap().is_candidate_key);
    // Cidade repeats, never a key
    assert!(!clientes.column("Cidade").unwrap().is_candidate_key);
    assert_eq!(clientes.key_column().unwrap().name, "ID");
}

#[test]
fn unreadable_table_becomes_stub_and_failure() {
    let mut corpus = erp_corpus();
    corpus.insert(
        "Estoque".to_string(),
        SampledTable::Unreadable("invalid utf-8 at byte 512".to_string()),
    );

    let outcome = profile_tables(&corpus, &AnalysisConfig::default()).unwrap();
    assert_eq!(outcome.report.tables_profiled, 2);
    assert_eq!(outcome.report.failures.len(), 1);
    assert_eq!(outcome.report.failures[0].table, "Estoque");
    assert!(outcome.report.failures[0].reason.contains("utf-8"));
    assert!(outcome.profiles["Estoque"].unreadable);
}

#[test]
fn ceiling_is_deterministic_across_runs() {
    let config = AnalysisConfig {
        max_tables: Some(3),
        ..AnalysisConfig::default()
    };
    let mut corpus = SampleCorpus::new();
    for name in ["Vendas", "Clientes", "Produtos", "Estoque", "Pedidos"] {
        corpus.insert(name.to_string(), sampled(name, &["ID"], &[&["1"]]));
    }

    let first = profile_tables(&corpus, &config).unwrap();
    let second = profile_tables(&corpus, &config).unwrap();

    let names: Vec<&String> = first.profiles.keys().collect();
    assert_eq!(names, vec!["Clientes", "Estoque", "Pedidos"]);
    assert_eq!(
        first.profiles.keys().collect::<Vec<_>>(),
        second.profiles.keys().collect::<Vec<_>>()
    );
    assert_eq!(first.report.tables_skipped_by_ceiling, 2);
}

#[test]
fn all_null_and_empty_columns_profile_cleanly() {
    let mut corpus = SampleCorpus::new();
    corpus.insert(
        "Legado".to_string(),
        sampled(
            "Legado",
            &["ID", "CampoAbandonado"],
            &[&["1", ""], &["2", ""], &["3", ""]],
        ),
    );
    let outcome = profile_tables(&corpus, &AnalysisConfig::default()).unwrap();
    let column = outcome.profiles["Legado"].column("CampoAbandonado").unwrap();
    assert_eq!(column.inferred_type, ColumnType::Unknown);
    assert_eq!(column.null_ratio, 1.0);
    assert_eq!(column.unique_ratio, 0.0);
    assert!(column.sample_values.is_empty());
}
