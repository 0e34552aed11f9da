//! The query boundary: an immutable vocabulary + corpus index handle.

use crate::assemble::{assemble, AssembleOptions, ProgressSink, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::filter::{filter, Filters};
use crate::identifier::{is_identifier_query, match_identifier};
use crate::index::{CorpusIndex, IndexedDocument, JournalMeta};
use crate::rank::{rank, rank_parallel, Scored};
use crate::record::Record;
use crate::vector::vectorize;
use crate::vocabulary::{Vocabulary, VocabularyConfig};
use crate::Position;
use serde::{Deserialize, Serialize};

/// Corpus size above which queries are ranked on the rayon pool.
const PARALLEL_RANK_THRESHOLD: usize = 16_384;

#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub vocabulary: VocabularyConfig,
    pub chunk_size: usize,
    /// Count document frequencies and vectorize chunks on the rayon pool.
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { vocabulary: VocabularyConfig::default(), chunk_size: DEFAULT_CHUNK_SIZE, parallel: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub top_k: usize,
    pub min_score: f32,
    pub filters: Filters,
}

impl Default for SearchOptions {
    fn default() -> Self { Self { top_k: 10, min_score: 0.1, filters: Filters::none() } }
}

impl SearchOptions {
    pub fn new(top_k: usize) -> Self { Self { top_k, ..Default::default() } }

    pub fn min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::query("top_k must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(Error::query(format!("min_score must be within [0, 1], got {}", self.min_score)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// 1-based rank in the final list.
    pub rank: usize,
    pub score: f32,
    pub position: Position,
    pub meta: JournalMeta,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_documents: usize,
    pub total_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEngine {
    vocab: Vocabulary,
    index: CorpusIndex,
}

impl SearchEngine {
    /// Extract every record, build the vocabulary over the full corpus, then
    /// vectorize it in chunks.
    pub fn build<I, P>(records: I, config: &BuildConfig, progress: &mut P) -> Result<Self>
    where
        I: IntoIterator<Item = Record>,
        P: ProgressSink + ?Sized,
    {
        let docs: Vec<(String, JournalMeta)> = records.into_iter().map(|r| extract(&r)).collect();
        if docs.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        tracing::info!(documents = docs.len(), "extracted records");

        let vocab = {
            let texts: Vec<&str> = docs.iter().map(|(t, _)| t.as_str()).collect();
            if config.parallel {
                Vocabulary::build_parallel(&texts, &config.vocabulary)?
            } else {
                Vocabulary::build(&texts, &config.vocabulary)?
            }
        };
        let opts = AssembleOptions { chunk_size: config.chunk_size, parallel: config.parallel };
        let index = assemble(docs, &vocab, opts, progress)?;
        Self::from_parts(vocab, index)
    }

    /// Assemble an engine from separately built or decoded parts, rejecting
    /// any combination a query could trip over.
    pub fn from_parts(vocab: Vocabulary, index: CorpusIndex) -> Result<Self> {
        vocab.check_integrity()?;
        if let Some(position) = index.vectors().iter().position(|v| !v.is_well_formed(vocab.len())) {
            return Err(Error::config(format!(
                "vector at position {position} does not fit a vocabulary of {} terms",
                vocab.len()
            )));
        }
        if !index.is_well_formed() {
            return Err(Error::config("corpus index positions are not contiguous"));
        }
        if index.len() != vocab.num_docs() {
            return Err(Error::config(format!(
                "vocabulary was built over {} documents but the index holds {}",
                vocab.num_docs(),
                index.len()
            )));
        }
        Ok(Self { vocab, index })
    }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocab }

    pub fn index(&self) -> &CorpusIndex { &self.index }

    pub fn document(&self, position: Position) -> Option<&IndexedDocument> {
        self.index.document(position)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats { total_documents: self.index.len(), total_features: self.vocab.len() }
    }

    /// Run one query. Identifier-shaped queries are exact ISSN lookups with
    /// score 1.0; anything else is ranked by cosine similarity. Filters are
    /// applied after retrieval over an enlarged candidate set.
    pub fn search(&self, query: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        opts.validate()?;

        let limit = opts.filters.fetch_limit(opts.top_k);
        let candidates = if is_identifier_query(query) {
            tracing::debug!(query, "identifier lookup");
            match_identifier(query, &self.index, limit)
        } else {
            self.rank_text(query, limit, opts.min_score)
        };
        let kept = filter(candidates, &opts.filters, &self.index, opts.top_k);

        let results: Vec<SearchResult> = kept
            .into_iter()
            .filter_map(|s| self.index.document(s.position).map(|d| (s, d)))
            .enumerate()
            .map(|(i, (s, doc))| SearchResult {
                rank: i + 1,
                score: s.score,
                position: doc.position,
                meta: doc.meta.clone(),
                text: doc.text.clone(),
            })
            .collect();
        tracing::debug!(query, hits = results.len(), "search complete");
        Ok(results)
    }

    fn rank_text(&self, query: &str, limit: usize, min_score: f32) -> Vec<Scored> {
        let qv = vectorize(query, &self.vocab);
        if self.index.len() >= PARALLEL_RANK_THRESHOLD {
            rank_parallel(&qv, &self.index, limit, min_score)
        } else {
            rank(&qv, &self.index, limit, min_score)
        }
    }
}
