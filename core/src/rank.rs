//! Cosine-similarity ranking over the flat vector store.
//!
//! Every document is scored; a bounded min-heap keeps the best `top_k`.
//! Order is score descending, then position ascending, so identical inputs
//! always produce identical output, sharded or not.

use crate::index::CorpusIndex;
use crate::vector::SparseVector;
use crate::Position;
use rayon::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Documents per shard when ranking in parallel.
const SHARD_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub position: Position,
    pub score: f32,
}

impl Eq for Scored {}

impl Ord for Scored {
    /// Greater means better: higher score, then lower position.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Root is the worst kept entry.
struct TopKHeap {
    k: usize,
    heap: BinaryHeap<Reverse<Scored>>,
}

impl TopKHeap {
    fn new(k: usize) -> Self {
        Self { k, heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1 << 16)) }
    }

    fn push(&mut self, entry: Scored) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(Reverse(entry));
        } else if let Some(root) = self.heap.peek() {
            if entry > root.0 {
                self.heap.pop();
                self.heap.push(Reverse(entry));
            }
        }
    }

    fn merge(mut self, other: TopKHeap) -> TopKHeap {
        for Reverse(entry) in other.heap {
            self.push(entry);
        }
        self
    }

    fn into_sorted_vec(self) -> Vec<Scored> {
        let mut out: Vec<Scored> = self.heap.into_iter().map(|r| r.0).collect();
        out.sort_by(|a, b| b.cmp(a));
        out
    }
}

fn qualifies(score: f32, min_score: f32) -> bool {
    score > 0.0 && score >= min_score
}

fn score_range(query: &SparseVector, vectors: &[SparseVector], offset: usize, top_k: usize, min_score: f32) -> TopKHeap {
    let mut heap = TopKHeap::new(top_k);
    for (i, doc) in vectors.iter().enumerate() {
        let score = query.dot(doc).min(1.0);
        if qualifies(score, min_score) {
            heap.push(Scored { position: offset + i, score });
        }
    }
    heap
}

/// Best `top_k` documents with score >= `min_score`. Documents sharing no
/// term with the query never qualify; a zero query returns nothing.
pub fn rank(query: &SparseVector, index: &CorpusIndex, top_k: usize, min_score: f32) -> Vec<Scored> {
    if query.is_zero() || top_k == 0 {
        return Vec::new();
    }
    score_range(query, index.vectors(), 0, top_k, min_score).into_sorted_vec()
}

/// [`rank`] with the vector store split into shards scored on the rayon
/// pool. Partial heaps are merged under the same total order.
pub fn rank_parallel(query: &SparseVector, index: &CorpusIndex, top_k: usize, min_score: f32) -> Vec<Scored> {
    if query.is_zero() || top_k == 0 {
        return Vec::new();
    }
    index
        .vectors()
        .par_chunks(SHARD_SIZE)
        .enumerate()
        .map(|(shard, vectors)| score_range(query, vectors, shard * SHARD_SIZE, top_k, min_score))
        .reduce(|| TopKHeap::new(top_k), TopKHeap::merge)
        .into_sorted_vec()
}
