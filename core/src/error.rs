//! Error types for index construction, persistence and querying.
//!
//! Bad individual records are not errors: the extractor degrades them and
//! the build continues. Everything here either halts a build or rejects a
//! query before it runs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Build was started with no records at all.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// Frequency filtering left nothing to index.
    #[error("vocabulary is empty: no term has document frequency in [{min_df}, {max_df_count}] across {num_docs} documents")]
    EmptyVocabulary {
        min_df: usize,
        max_df_count: usize,
        num_docs: usize,
    },

    /// A build or query parameter is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A search was attempted with no index loaded.
    #[error("index unavailable: {reason}")]
    IndexUnavailable { reason: String },

    /// Query text was empty after trimming.
    #[error("query is empty")]
    EmptyQuery,

    /// Query options are out of range.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Persisted index bytes are not a snapshot this build can read.
    #[error("index is corrupt: {message}")]
    CorruptIndex { message: String },

    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig { message: message.into() }
    }

    pub(crate) fn query(message: impl Into<String>) -> Self {
        Error::InvalidQuery { message: message.into() }
    }

    /// True for errors a caller should report as a bad request rather than a
    /// server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::EmptyQuery | Error::InvalidQuery { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
