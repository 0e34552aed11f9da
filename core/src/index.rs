use crate::vector::SparseVector;
use crate::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fixed-shape metadata for one journal. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalMeta {
    pub title: String,
    pub publisher: String,
    pub source_type: String,
    pub issn: String,
    pub eissn: String,
    pub open_access: String,
    pub active_status: String,
    pub coverage: String,
    pub subject_codes: BTreeSet<String>,
    pub language: String,
    /// Catalog's own record id (Scopus "Sourcerecord ID").
    pub external_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub position: Position,
    pub text: String,
    pub meta: JournalMeta,
}

/// Document vectors and documents, aligned by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusIndex {
    vectors: Vec<SparseVector>,
    docs: Vec<IndexedDocument>,
}

impl CorpusIndex {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(n: usize) -> Self {
        Self { vectors: Vec::with_capacity(n), docs: Vec::with_capacity(n) }
    }

    /// Append one document, assigning it the next position.
    pub(crate) fn push(&mut self, text: String, meta: JournalMeta, vector: SparseVector) -> Position {
        let position = self.docs.len();
        self.docs.push(IndexedDocument { position, text, meta });
        self.vectors.push(vector);
        position
    }

    /// Merge a partial index built over the next contiguous slice of the
    /// corpus. Its documents are renumbered to follow ours.
    pub(crate) fn append(&mut self, partial: CorpusIndex) {
        let offset = self.docs.len();
        self.vectors.extend(partial.vectors);
        self.docs.extend(partial.docs.into_iter().map(|mut d| {
            d.position += offset;
            d
        }));
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn vectors(&self) -> &[SparseVector] { &self.vectors }

    pub fn documents(&self) -> &[IndexedDocument] { &self.docs }

    pub fn document(&self, position: Position) -> Option<&IndexedDocument> {
        self.docs.get(position)
    }

    pub fn vector(&self, position: Position) -> Option<&SparseVector> {
        self.vectors.get(position)
    }

    /// Vector and document stores are the same length and every document
    /// sits at its own position.
    pub fn is_well_formed(&self) -> bool {
        self.vectors.len() == self.docs.len()
            && self.docs.iter().enumerate().all(|(i, d)| d.position == i)
    }
}
