use anyhow::{Context, Result};
use catalog_core::persist::{load_index, save_index, IndexPaths};
use catalog_core::{
    describe, AnalyzerConfig, BuildConfig, ChunkProgress, Filters, Record, SearchEngine, SearchOptions,
    VocabularyConfig,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query the journal catalog TF-IDF index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from JSON/JSONL record files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long, env = "CATALOG_INDEX_DIR", default_value = "./index")]
        output: String,
        /// Keep at most this many terms
        #[arg(long, default_value_t = 10_000)]
        max_features: usize,
        /// Minimum number of documents a term must appear in
        #[arg(long, default_value_t = 5)]
        min_df: usize,
        /// Maximum fraction of documents a term may appear in
        #[arg(long, default_value_t = 0.95)]
        max_df: f64,
        /// Records vectorized per chunk
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,
        /// Apply English stemming to terms
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Build on a single thread
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Run one query against a built index
    Search {
        /// Index directory
        #[arg(long, env = "CATALOG_INDEX_DIR", default_value = "./index")]
        index: String,
        /// Query text or ISSN
        query: String,
        #[arg(long, default_value_t = 10)]
        count: usize,
        #[arg(long, default_value_t = 0.1)]
        min_score: f32,
        /// Case-insensitive publisher substring
        #[arg(long)]
        publisher: Option<String>,
        /// Comma-separated ASJC codes
        #[arg(long)]
        subjects: Option<String>,
        /// Print identifiers, access status and a description per result
        #[arg(long, default_value_t = false)]
        details: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, max_features, min_df, max_df, chunk_size, stem, sequential } => {
            let config = BuildConfig {
                vocabulary: VocabularyConfig {
                    max_features: Some(max_features),
                    min_df,
                    max_df,
                    analyzer: AnalyzerConfig { stem, ..Default::default() },
                },
                chunk_size,
                parallel: !sequential,
            };
            build_index(&input, &output, &config)
        }
        Commands::Search { index, query, count, min_score, publisher, subjects, details } => {
            let filters = Filters {
                publisher,
                subject_codes: subjects.as_deref().map(Filters::parse_subject_codes).unwrap_or_default(),
                ..Default::default()
            };
            let opts = SearchOptions::new(count).min_score(min_score).filters(filters);
            run_search(&index, &query, &opts, details)
        }
    }
}

fn collect_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

/// Records read from all input files, in file then line order.
#[derive(Default)]
struct Loaded {
    records: Vec<Record>,
    skipped: usize,
}

fn load_records(input: &str) -> Result<Loaded> {
    let files = collect_files(Path::new(input));
    if files.is_empty() {
        anyhow::bail!("no .json or .jsonl files found at {input}");
    }
    let mut loaded = Loaded::default();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut loaded)?;
        } else {
            read_json(&file, &mut loaded)?;
        }
    }
    Ok(loaded)
}

fn read_jsonl(file: &Path, loaded: &mut Loaded) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match serde_json::from_str::<Record>(&line) {
            Ok(record) => loaded.records.push(record),
            Err(err) => {
                tracing::warn!(file = %file.display(), line = lineno + 1, %err, "skipping unparseable record");
                loaded.skipped += 1;
            }
        }
    }
    Ok(())
}

fn read_json(file: &Path, loaded: &mut Loaded) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value =
        serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => Vec::new(),
    };
    for (i, v) in values.into_iter().enumerate() {
        match serde_json::from_value::<Record>(v) {
            Ok(record) => loaded.records.push(record),
            Err(err) => {
                tracing::warn!(file = %file.display(), item = i, %err, "skipping unparseable record");
                loaded.skipped += 1;
            }
        }
    }
    Ok(())
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} vectorizing [{bar:40}] {pos}/{len} records ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

fn build_index(input: &str, output: &str, config: &BuildConfig) -> Result<()> {
    let loaded = load_records(input)?;
    tracing::info!(records = loaded.records.len(), skipped = loaded.skipped, "loaded records");

    let bar = progress_bar(loaded.records.len());
    let mut on_chunk = |p: &ChunkProgress| bar.set_position(p.documents_done as u64);
    let engine = SearchEngine::build(loaded.records, config, &mut on_chunk).context("building index")?;
    bar.finish_and_clear();

    let paths = IndexPaths::new(output);
    let stats = save_index(&paths, &engine, input)?;
    tracing::info!(
        output,
        documents = stats.total_documents,
        features = stats.total_features,
        "index build complete"
    );
    Ok(())
}

fn run_search(index: &str, query: &str, opts: &SearchOptions, details: bool) -> Result<()> {
    let engine = load_index(&IndexPaths::new(index))?;
    let results = engine.search(query, opts)?;
    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }
    println!("Found {} results:", results.len());
    for r in &results {
        println!("{}. {}", r.rank, r.meta.title);
        println!("   Publisher: {}", r.meta.publisher);
        println!("   Type: {}", r.meta.source_type);
        println!("   Similarity Score: {:.4}", r.score);
        if details {
            for (label, value) in [("ISSN", &r.meta.issn), ("eISSN", &r.meta.eissn), ("Open Access", &r.meta.open_access)] {
                if !value.is_empty() {
                    println!("   {label}: {value}");
                }
            }
            if !r.meta.subject_codes.is_empty() {
                let codes: Vec<&str> = r.meta.subject_codes.iter().map(String::as_str).collect();
                println!("   Subject Areas: {}", codes.join("; "));
            }
            println!("   {}", describe(&r.meta));
        }
        println!();
    }
    Ok(())
}
