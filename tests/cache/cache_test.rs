//! Integration tests for fingerprinting and the result cache.

use relmine::cache::{graph_fingerprint, table_fingerprint, ProfileCache};
use relmine::config::AnalysisConfig;
use relmine::profile::{SampledTable, SourceDescriptor, TableProfile, TableSample};

use std::collections::BTreeMap;
use std::path::PathBuf;

fn loaded(name: &str, mtime: i64) -> SampledTable {
    SampledTable::Loaded(
        TableSample::new(
            name,
            vec!["ID".to_string(), "Nome".to_string()],
            vec![vec!["1".to_string(), "Ana".to_string()]],
        )
        .with_source(SourceDescriptor {
            path: PathBuf::from(format!("/data/{}.csv", name.to_lowercase())),
            size_bytes: 1024,
            mtime_unix: mtime,
            content_hash: None,
        }),
    )
}

#[test]
fn unchanged_table_hits_the_cache() {
    let config = AnalysisConfig::default();
    let cache = ProfileCache::open_in_memory().unwrap();
    let table = loaded("Clientes", 1000);

    let fp = table_fingerprint("Clientes", &table, &config).unwrap();
    assert!(cache.get_profile(&fp).is_none());

    cache.put_profile(&fp, &TableProfile::stub("Clientes")).unwrap();

    let fp_again = table_fingerprint("Clientes", &table, &config).unwrap();
    assert_eq!(fp, fp_again);
    assert!(cache.get_profile(&fp_again).is_some());
}

#[test]
fn invalidation_scope_is_per_table() {
    let config = AnalysisConfig::default();
    let cache = ProfileCache::open_in_memory().unwrap();

    let clientes_fp = table_fingerprint("Clientes", &loaded("Clientes", 1000), &config).unwrap();
    let pedidos_fp = table_fingerprint("Pedidos", &loaded("Pedidos", 1000), &config).unwrap();
    cache.put_profile(&clientes_fp, &TableProfile::stub("Clientes")).unwrap();
    cache.put_profile(&pedidos_fp, &TableProfile::stub("Pedidos")).unwrap();

    // Pedidos changed on disk; its fingerprint moves, Clientes' doesn't
    let pedidos_fp2 = table_fingerprint("Pedidos", &loaded("Pedidos", 2000), &config).unwrap();
    assert_ne!(pedidos_fp, pedidos_fp2);
    assert!(cache.get_profile(&pedidos_fp2).is_none());
    assert!(cache.get_profile(&clientes_fp).is_some());
}

#[test]
fn graph_invalidation_scope_is_the_whole_corpus() {
    let config = AnalysisConfig::default();

    let mut fps = BTreeMap::new();
    fps.insert(
        "Clientes".to_string(),
        table_fingerprint("Clientes", &loaded("Clientes", 1000), &config).unwrap(),
    );
    fps.insert(
        "Pedidos".to_string(),
        table_fingerprint("Pedidos", &loaded("Pedidos", 1000), &config).unwrap(),
    );
    let before = graph_fingerprint(&fps, &config).unwrap();

    fps.insert(
        "Pedidos".to_string(),
        table_fingerprint("Pedidos", &loaded("Pedidos", 2000), &config).unwrap(),
    );
    let after = graph_fingerprint(&fps, &config).unwrap();
    assert_ne!(before, after);
}

#[test]
fn scoring_config_invalidates_but_display_config_does_not() {
    let table = loaded("Clientes", 1000);
    let base = AnalysisConfig::default();

    let reweighted = AnalysisConfig {
        weights: relmine::config::ScoringWeights {
            naming: 0.5,
            ..Default::default()
        },
        ..Default::default()
    };
    let retiered = AnalysisConfig {
        tiers: relmine::config::ConfidenceTiers {
            high: 0.8,
            medium: 0.5,
            low: 0.1,
        },
        ..Default::default()
    };

    let base_fp = table_fingerprint("Clientes", &table, &base).unwrap();
    assert_ne!(
        base_fp,
        table_fingerprint("Clientes", &table, &reweighted).unwrap()
    );
    assert_eq!(
        base_fp,
        table_fingerprint("Clientes", &table, &retiered).unwrap()
    );
}

#[test]
fn unreadable_tables_still_fingerprint() {
    let config = AnalysisConfig::default();
    let a = table_fingerprint(
        "Quebrada",
        &SampledTable::Unreadable("encoding error".to_string()),
        &config,
    )
    .unwrap();
    let b = table_fingerprint(
        "Quebrada",
        &SampledTable::Unreadable("file truncated".to_string()),
        &config,
    )
    .unwrap();
    // The reason is part of the identity
    assert_ne!(a, b);
}

#[test]
fn cache_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    {
        let cache = ProfileCache::open(Some(path.clone())).unwrap();
        cache.put_profile("fp1", &TableProfile::stub("Clientes")).unwrap();
    }

    let cache = ProfileCache::open(Some(path)).unwrap();
    let profile = cache.get_profile("fp1").unwrap();
    assert_eq!(profile.table_name, "Clientes");
}

#[test]
fn samples_without_source_metadata_fingerprint_on_content() {
    let config = AnalysisConfig::default();
    let sample = |value: &str| {
        SampledTable::Loaded(TableSample::new(
            "T",
            vec!["ID".to_string()],
            vec![vec![value.to_string()]],
        ))
    };
    let a = table_fingerprint("T", &sample("1"), &config).unwrap();
    let b = table_fingerprint("T", &sample("1"), &config).unwrap();
    let c = table_fingerprint("T", &sample("2"), &config).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}
