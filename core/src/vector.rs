use crate::tokenizer::analyze;
use crate::vocabulary::Vocabulary;
use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// L2-normalized TF-IDF vector. `ids` is strictly ascending and parallel
/// to `weights`; zero weights are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    ids: Vec<TermId>,
    weights: Vec<f32>,
}

impl SparseVector {
    pub fn zero() -> Self { Self::default() }

    pub fn is_zero(&self) -> bool { self.ids.is_empty() }

    pub fn nnz(&self) -> usize { self.ids.len() }

    pub fn ids(&self) -> &[TermId] { &self.ids }

    pub fn weights(&self) -> &[f32] { &self.weights }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f32)> + '_ {
        self.ids.iter().copied().zip(self.weights.iter().copied())
    }

    pub fn weight(&self, id: TermId) -> f32 {
        match self.ids.binary_search(&id) {
            Ok(i) => self.weights[i],
            Err(_) => 0.0,
        }
    }

    pub fn norm(&self) -> f32 {
        self.weights.iter().map(|w| w * w).sum::<f32>().sqrt()
    }

    /// Sparse dot product by merging the two sorted id lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.weights[i] * other.weights[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Ids strictly ascending and below `dim`, one finite weight per id.
    pub(crate) fn is_well_formed(&self, dim: usize) -> bool {
        self.ids.len() == self.weights.len()
            && self.ids.windows(2).all(|w| w[0] < w[1])
            && self.ids.last().map_or(true, |&id| (id as usize) < dim)
            && self.weights.iter().all(|w| w.is_finite())
    }

    /// Normalize raw (id, weight) pairs. Non-positive weights are dropped; an
    /// all-zero input stays the zero vector.
    fn from_raw(raw: BTreeMap<TermId, f32>) -> Self {
        let norm = raw.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Self::zero();
        }
        let mut ids = Vec::with_capacity(raw.len());
        let mut weights = Vec::with_capacity(raw.len());
        for (id, w) in raw {
            if w > 0.0 {
                ids.push(id);
                weights.push(w / norm);
            }
        }
        Self { ids, weights }
    }
}

/// TF-IDF vector of `text` in the vocabulary's term space. Raw term counts
/// times IDF, then L2-normalized. Out-of-vocabulary terms are ignored.
pub fn vectorize(text: &str, vocab: &Vocabulary) -> SparseVector {
    let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
    for term in analyze(text, vocab.analyzer()) {
        if let Some(id) = vocab.term_id(&term) {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    let raw = counts
        .into_iter()
        .filter_map(|(id, tf)| vocab.idf(id).map(|idf| (id, tf as f32 * idf)))
        .collect();
    SparseVector::from_raw(raw)
}
