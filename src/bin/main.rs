//! Relmine CLI - Profile table dumps and mine their relationships
//!
//! Usage:
//!   relmine analyze <dir> [--sample-size <n>] [--min-confidence <c>] [--json]
//!   relmine joins <dir> <from> <to>
//!   relmine clear-cache
//!
//! Examples:
//!   relmine analyze ./dumps --sample-size 5000
//!   relmine analyze ./dumps --json > relationships.json
//!   relmine joins ./dumps Clientes Produtos

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::UNIX_EPOCH;

use clap::{Parser, Subcommand};

use relmine::profile::{tables_by_category, SourceDescriptor, TableSample};
use relmine::{
    AnalysisConfig, AnalysisResult, AnalysisRun, SampleCorpus, SampledTable, SchemaAnalyzer,
};

#[derive(Parser)]
#[command(name = "relmine")]
#[command(about = "Relmine - profile table dumps and mine their foreign-key relationships")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile every CSV dump in a directory and mine relationships
    Analyze {
        /// Directory containing one .csv file per table
        dir: PathBuf,

        /// Rows sampled per table
        #[arg(long)]
        sample_size: Option<usize>,

        /// Analyze only the first N tables (lexicographic by name)
        #[arg(long)]
        max_tables: Option<usize>,

        /// Drop candidates scoring below this confidence
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Path to a relmine.toml configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the result cache entirely
        #[arg(long)]
        no_cache: bool,

        /// Emit the full result as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Suggest ways to join two tables
    Joins {
        /// Directory containing one .csv file per table
        dir: PathBuf,

        /// Starting table name
        from: String,

        /// Destination table name
        to: String,

        /// Path to a relmine.toml configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Delete all cached profiles and graphs
    ClearCache,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            dir,
            sample_size,
            max_tables,
            min_confidence,
            config,
            no_cache,
            json,
        } => cmd_analyze(
            dir,
            sample_size,
            max_tables,
            min_confidence,
            config,
            no_cache,
            json,
        ),
        Commands::Joins {
            dir,
            from,
            to,
            config,
        } => cmd_joins(dir, &from, &to, config),
        Commands::ClearCache => cmd_clear_cache(),
    }
}

fn load_config(path: Option<PathBuf>) -> AnalysisResult<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(&path),
        None => Ok(AnalysisConfig::default()),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    dir: PathBuf,
    sample_size: Option<usize>,
    max_tables: Option<usize>,
    min_confidence: Option<f64>,
    config_path: Option<PathBuf>,
    no_cache: bool,
    json: bool,
) -> ExitCode {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(n) = sample_size {
        config.sample_size = n;
    }
    if let Some(n) = max_tables {
        config.max_tables = Some(n);
    }
    if let Some(c) = min_confidence {
        config.min_confidence = c;
    }
    if no_cache {
        config.cache.enabled = false;
    }

    let run = match run_analysis(&dir, &config) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Analysis error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        print_json(&run, &config)
    } else {
        print_report(&run, &config);
        ExitCode::SUCCESS
    }
}

fn run_analysis(dir: &Path, config: &AnalysisConfig) -> AnalysisResult<AnalysisRun> {
    let corpus = load_corpus(dir, config)?;
    let analyzer = SchemaAnalyzer::new(config.clone())?;
    analyzer.analyze(&corpus)
}

fn print_json(run: &AnalysisRun, config: &AnalysisConfig) -> ExitCode {
    let records = run.records(config);
    let payload = serde_json::json!({
        "relationships": records,
        "report": run.report,
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_report(run: &AnalysisRun, config: &AnalysisConfig) {
    println!("Tables:");
    for (category, tables) in tables_by_category(&run.profiles) {
        println!("  {} ({})", category, tables.len());
        for table in tables {
            let profile = &run.profiles[table];
            if profile.unreadable {
                println!("    - {} (unreadable)", table);
            } else {
                let marker = if profile.exact_row_count { "" } else { "~" };
                println!(
                    "    - {} ({}{} rows, {} columns)",
                    table,
                    marker,
                    profile.row_count_estimate,
                    profile.column_order.len()
                );
            }
        }
    }

    let records = run.records(config);
    println!();
    println!("Relationships ({}):", records.len());
    for record in &records {
        let loop_marker = if record.self_reference { " [self]" } else { "" };
        println!(
            "  {}.{} -> {}.{}  {:.2} ({}, {}, {}){}",
            record.source_table,
            record.source_column,
            record.target_table,
            record.target_column,
            record.confidence,
            record.tier,
            record.cardinality,
            record.rule,
            loop_marker
        );
    }

    let report = &run.report;
    println!();
    println!(
        "Profiled {} tables ({} cache hits, {} misses), graph {}",
        report.tables_profiled,
        report.profile_cache_hits,
        report.profile_cache_misses,
        if report.graph_from_cache {
            "from cache"
        } else {
            "recomputed"
        }
    );
    if report.tables_skipped_by_ceiling > 0 {
        println!(
            "Skipped {} tables over the --max-tables ceiling",
            report.tables_skipped_by_ceiling
        );
    }
    for failure in &report.failures {
        eprintln!("Failed to read '{}': {}", failure.table, failure.reason);
    }
}

fn cmd_joins(dir: PathBuf, from: &str, to: &str, config_path: Option<PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let run = match run_analysis(&dir, &config) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Analysis error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let paths = run.graph.join_paths(from, to);
    if paths.is_empty() {
        println!("No join path found between {} and {}", from, to);
        return ExitCode::SUCCESS;
    }

    for path in paths {
        println!("{}", path.tables.join(" -> "));
        for step in &path.steps {
            println!(
                "    {}.{} = {}.{}  ({:.2})",
                step.source_table,
                step.source_column,
                step.target_table,
                step.target_column,
                step.confidence
            );
        }
    }
    ExitCode::SUCCESS
}

fn cmd_clear_cache() -> ExitCode {
    let result = relmine::cache::ProfileCache::open(None).and_then(|cache| cache.clear_all());
    match result {
        Ok(()) => {
            println!("Cache cleared.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Cache error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load every `*.csv` file in the directory as a table sample.
///
/// The table name is the file stem. A file that cannot be read becomes an
/// unreadable entry; the rest of the corpus still loads.
fn load_corpus(dir: &Path, config: &AnalysisConfig) -> AnalysisResult<SampleCorpus> {
    let mut corpus = SampleCorpus::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let table_name = stem.to_string();

        let sampled = match load_sample(&table_name, &path, config.sample_size) {
            Ok(sample) => SampledTable::Loaded(sample),
            Err(reason) => SampledTable::Unreadable(reason),
        };
        corpus.insert(table_name, sampled);
    }

    Ok(corpus)
}

/// Read the header plus up to `sample_size` rows, then count the remainder
/// so the profile gets an exact total row count.
fn load_sample(table_name: &str, path: &Path, sample_size: usize) -> Result<TableSample, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut total: u64 = 0;
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        total += 1;
        if rows.len() < sample_size {
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }
    }

    let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
    let mtime_unix = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    Ok(TableSample::new(table_name, columns, rows)
        .with_total_rows(total)
        .with_source(SourceDescriptor {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            mtime_unix,
            content_hash: None,
        }))
}
