//! Chunked corpus vectorization.
//!
//! The vocabulary is built from the whole corpus first; after that every
//! document vector depends only on its own text, so chunks are vectorized
//! independently and appended in order.

use crate::error::{Error, Result};
use crate::index::{CorpusIndex, JournalMeta};
use crate::vector::{vectorize, SparseVector};
use crate::vocabulary::Vocabulary;
use rayon::prelude::*;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    pub chunk_size: usize,
    /// Vectorize each chunk on the rayon pool.
    pub parallel: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self { Self { chunk_size: DEFAULT_CHUNK_SIZE, parallel: false } }
}

/// Reported after each chunk is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    /// 1-based index of the chunk just merged.
    pub chunk: usize,
    pub chunks_total: Option<usize>,
    pub documents_done: usize,
    pub documents_total: Option<usize>,
}

pub trait ProgressSink {
    fn on_chunk(&mut self, progress: &ChunkProgress);
}

impl<F: FnMut(&ChunkProgress)> ProgressSink for F {
    fn on_chunk(&mut self, progress: &ChunkProgress) { self(progress) }
}

/// Discards progress events.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_chunk(&mut self, _progress: &ChunkProgress) {}
}

/// Vectorize `documents` against `vocab` in chunks of `opts.chunk_size`,
/// producing an index whose positions follow input order.
pub fn assemble<I, P>(documents: I, vocab: &Vocabulary, opts: AssembleOptions, progress: &mut P) -> Result<CorpusIndex>
where
    I: IntoIterator<Item = (String, JournalMeta)>,
    P: ProgressSink + ?Sized,
{
    if opts.chunk_size == 0 {
        return Err(Error::config("chunk_size must be positive"));
    }
    let mut iter = documents.into_iter();
    let documents_total = match iter.size_hint() {
        (lo, Some(hi)) if lo == hi => Some(lo),
        _ => None,
    };
    let chunks_total = documents_total.map(|n| n.div_ceil(opts.chunk_size));
    let mut index = CorpusIndex::with_capacity(documents_total.unwrap_or(0));
    let mut chunk_no = 0;

    loop {
        let chunk: Vec<(String, JournalMeta)> = iter.by_ref().take(opts.chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunk_no += 1;
        index.append(vectorize_chunk(chunk, vocab, opts.parallel));
        debug_assert!(index.is_well_formed());

        tracing::debug!(chunk = chunk_no, documents = index.len(), "merged chunk");
        progress.on_chunk(&ChunkProgress {
            chunk: chunk_no,
            chunks_total,
            documents_done: index.len(),
            documents_total,
        });
    }
    Ok(index)
}

/// Partial index for one chunk, positions starting at zero.
fn vectorize_chunk(chunk: Vec<(String, JournalMeta)>, vocab: &Vocabulary, parallel: bool) -> CorpusIndex {
    let vectors: Vec<SparseVector> = if parallel {
        chunk.par_iter().map(|(text, _)| vectorize(text, vocab)).collect()
    } else {
        chunk.iter().map(|(text, _)| vectorize(text, vocab)).collect()
    };
    let mut partial = CorpusIndex::with_capacity(chunk.len());
    for ((text, meta), vector) in chunk.into_iter().zip(vectors) {
        partial.push(text, meta, vector);
    }
    partial
}
