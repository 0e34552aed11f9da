//! Search core for a bibliographic journal catalog.
//!
//! Records go through [`extract`] into text + metadata, the texts build a
//! frozen [`Vocabulary`], and the [`assemble`] pass vectorizes the corpus in
//! chunks into a [`CorpusIndex`]. [`SearchEngine`] owns both and answers
//! free-text and identifier queries.

pub mod assemble;
pub mod describe;
pub mod engine;
pub mod error;
pub mod extract;
pub mod filter;
pub mod identifier;
pub mod index;
pub mod persist;
pub mod rank;
pub mod record;
pub mod tokenizer;
pub mod vector;
pub mod vocabulary;

pub use assemble::{assemble, AssembleOptions, ChunkProgress, NoProgress, ProgressSink};
pub use describe::describe;
pub use engine::{BuildConfig, EngineStats, SearchEngine, SearchOptions, SearchResult};
pub use error::{Error, Result};
pub use extract::extract;
pub use filter::Filters;
pub use index::{CorpusIndex, IndexedDocument, JournalMeta};
pub use persist::{IndexPaths, IndexStats};
pub use record::{FieldValue, Record};
pub use tokenizer::AnalyzerConfig;
pub use vector::{vectorize, SparseVector};
pub use vocabulary::{Vocabulary, VocabularyConfig};

pub type TermId = u32;
pub type Position = usize;
