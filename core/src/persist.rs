use crate::engine::SearchEngine;
use crate::error::{Error, Result};
use crate::index::CorpusIndex;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"JCIX";
pub const FORMAT_VERSION: u8 = 1;

/// Summary written next to the index, readable without loading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_features: usize,
    /// Where the records came from (file or directory given to the indexer).
    pub source: String,
    pub created_at: String,
    pub version: u8,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.bin") }
    pub fn stats(&self) -> PathBuf { self.root.join("stats.json") }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    vocab: &'a Vocabulary,
    index: &'a CorpusIndex,
}

#[derive(Deserialize)]
struct Snapshot {
    vocab: Vocabulary,
    index: CorpusIndex,
}

/// Magic, format version, then the bincode-encoded vocabulary and index.
pub fn serialize(engine: &SearchEngine) -> Result<Vec<u8>> {
    let body = bincode::serialize(&SnapshotRef { vocab: engine.vocabulary(), index: engine.index() })?;
    let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

pub fn deserialize(bytes: &[u8]) -> Result<SearchEngine> {
    let corrupt = |message: String| Error::CorruptIndex { message };
    if bytes.len() < MAGIC.len() + 1 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(corrupt("missing index header".into()));
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {version}, expected {FORMAT_VERSION}")));
    }
    let snapshot: Snapshot = bincode::deserialize(&bytes[MAGIC.len() + 1..]).map_err(|e| corrupt(e.to_string()))?;
    SearchEngine::from_parts(snapshot.vocab, snapshot.index).map_err(|e| corrupt(e.to_string()))
}

/// Write the index and its stats file. The index is written to a temporary
/// file first so a concurrent reader never sees a partial file.
pub fn save_index(paths: &IndexPaths, engine: &SearchEngine, source: &str) -> Result<IndexStats> {
    create_dir_all(&paths.root)?;
    let bytes = serialize(engine)?;
    let tmp = paths.root.join("index.bin.tmp");
    {
        let mut f = File::create(&tmp)?;
        f.write_all(&bytes)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, paths.index())?;

    let stats = engine.stats();
    let stats = IndexStats {
        total_documents: stats.total_documents,
        total_features: stats.total_features,
        source: source.to_string(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: FORMAT_VERSION,
    };
    save_stats(paths, &stats)?;
    Ok(stats)
}

pub fn load_index(paths: &IndexPaths) -> Result<SearchEngine> {
    let path = paths.index();
    let mut f = File::open(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::IndexUnavailable { reason: format!("{} not found", path.display()) },
        _ => Error::Io(e),
    })?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let engine = deserialize(&buf)?;
    tracing::info!(path = %path.display(), documents = engine.index().len(), "index loaded");
    Ok(engine)
}

pub fn save_stats(paths: &IndexPaths, stats: &IndexStats) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.stats())?;
    let json = serde_json::to_string_pretty(stats)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_stats(paths: &IndexPaths) -> Result<IndexStats> {
    let mut f = File::open(paths.stats())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let stats: IndexStats = serde_json::from_str(&buf)?;
    Ok(stats)
}

/// Size of the index file in bytes, if present.
pub fn index_size(paths: &IndexPaths) -> Option<u64> {
    fs::metadata(paths.index()).ok().map(|m| m.len())
}
