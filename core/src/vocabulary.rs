//! Corpus-wide term vocabulary with document frequencies and IDF weights.

use crate::error::{Error, Result};
use crate::tokenizer::{analyze, AnalyzerConfig};
use crate::TermId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Keep at most this many terms (highest document frequency first).
    pub max_features: Option<usize>,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    pub analyzer: AnalyzerConfig,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self { max_features: Some(10_000), min_df: 5, max_df: 0.95, analyzer: AnalyzerConfig::default() }
    }
}

impl VocabularyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(Error::config("min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::config(format!("max_df must be in (0, 1], got {}", self.max_df)));
        }
        if self.max_features == Some(0) {
            return Err(Error::config("max_features must be positive"));
        }
        let (lo, hi) = self.analyzer.ngram_range;
        if lo == 0 || lo > hi {
            return Err(Error::config(format!("invalid ngram_range ({lo}, {hi})")));
        }
        Ok(())
    }
}

/// Per-term (document frequency, total term frequency).
type Counts = HashMap<String, (u32, u64)>;

fn count_document(acc: &mut Counts, text: &str, analyzer: &AnalyzerConfig) {
    let mut seen: HashSet<&str> = HashSet::new();
    let terms = analyze(text, analyzer);
    for term in &terms {
        let first = seen.insert(term.as_str());
        match acc.get_mut(term.as_str()) {
            Some(entry) => {
                entry.1 += 1;
                if first { entry.0 += 1; }
            }
            None => {
                acc.insert(term.clone(), (1, 1));
            }
        }
    }
}

fn merge_counts(mut a: Counts, b: Counts) -> Counts {
    if a.len() < b.len() {
        return merge_counts(b, a);
    }
    for (term, (df, tf)) in b {
        let entry = a.entry(term).or_insert((0, 0));
        entry.0 += df;
        entry.1 += tf;
    }
    a
}

/// Frozen term space. Term ids are assigned in selection order: descending
/// document frequency, then descending term frequency, then term text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    idf: Vec<f32>,
    num_docs: usize,
    analyzer: AnalyzerConfig,
}

impl Vocabulary {
    /// Single pass over all texts.
    pub fn build<S: AsRef<str>>(texts: &[S], config: &VocabularyConfig) -> Result<Self> {
        config.validate()?;
        let mut counts = Counts::new();
        for text in texts {
            count_document(&mut counts, text.as_ref(), &config.analyzer);
        }
        Self::from_counts(counts, texts.len(), config)
    }

    /// Same result as [`Vocabulary::build`]; counts are gathered per worker and
    /// reduced once before selection.
    pub fn build_parallel<S: AsRef<str> + Sync>(texts: &[S], config: &VocabularyConfig) -> Result<Self> {
        config.validate()?;
        let counts = texts
            .par_iter()
            .fold(Counts::new, |mut acc, text| {
                count_document(&mut acc, text.as_ref(), &config.analyzer);
                acc
            })
            .reduce(Counts::new, merge_counts);
        Self::from_counts(counts, texts.len(), config)
    }

    fn from_counts(counts: Counts, num_docs: usize, config: &VocabularyConfig) -> Result<Self> {
        if num_docs == 0 {
            return Err(Error::EmptyCorpus);
        }
        let max_df_limit = config.max_df * num_docs as f64;
        let max_df_count = max_df_limit.floor() as usize;
        if max_df_limit < config.min_df as f64 {
            return Err(Error::config(format!(
                "max_df={} over {num_docs} documents allows at most {max_df_count} documents per term, fewer than min_df={}",
                config.max_df, config.min_df
            )));
        }

        let mut kept: Vec<(String, u32, u64)> = counts
            .into_iter()
            .filter(|(_, (df, _))| (*df as usize) >= config.min_df && f64::from(*df) <= max_df_limit)
            .map(|(term, (df, tf))| (term, df, tf))
            .collect();
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.cmp(&a.2)).then_with(|| a.0.cmp(&b.0)));
        if let Some(max) = config.max_features {
            kept.truncate(max);
        }
        if kept.is_empty() {
            return Err(Error::EmptyVocabulary { min_df: config.min_df, max_df_count, num_docs });
        }

        let n = num_docs as f64;
        let mut terms = Vec::with_capacity(kept.len());
        let mut dictionary = HashMap::with_capacity(kept.len());
        let mut df = Vec::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (id, (term, term_df, _)) in kept.into_iter().enumerate() {
            dictionary.insert(term.clone(), id as TermId);
            terms.push(term);
            df.push(term_df);
            idf.push((((1.0 + n) / (1.0 + term_df as f64)).ln() + 1.0) as f32);
        }
        tracing::info!(num_docs, num_terms = terms.len(), "vocabulary built");
        Ok(Self { terms, dictionary, df, idf, num_docs, analyzer: config.analyzer.clone() })
    }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn num_docs(&self) -> usize { self.num_docs }

    pub fn analyzer(&self) -> &AnalyzerConfig { &self.analyzer }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn term(&self, id: TermId) -> Option<&str> { self.terms.get(id as usize).map(String::as_str) }

    pub fn terms(&self) -> &[String] { &self.terms }

    pub fn df(&self, id: TermId) -> Option<u32> { self.df.get(id as usize).copied() }

    pub fn idf(&self, id: TermId) -> Option<f32> { self.idf.get(id as usize).copied() }

    /// Check a vocabulary that did not come from [`Vocabulary::build`]:
    /// parallel tables of equal length, a dictionary that maps every term to
    /// its own id, finite positive IDF and a usable n-gram range.
    pub(crate) fn check_integrity(&self) -> Result<()> {
        let n = self.terms.len();
        if self.df.len() != n || self.idf.len() != n || self.dictionary.len() != n {
            return Err(Error::config(format!(
                "vocabulary tables disagree: {} terms, {} df, {} idf, {} dictionary entries",
                n,
                self.df.len(),
                self.idf.len(),
                self.dictionary.len()
            )));
        }
        for (term, &id) in &self.dictionary {
            if self.terms.get(id as usize) != Some(term) {
                return Err(Error::config(format!("dictionary maps {term:?} to id {id}, which holds a different term")));
            }
        }
        if let Some(w) = self.idf.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(Error::config(format!("invalid idf weight {w}")));
        }
        let (lo, hi) = self.analyzer.ngram_range;
        if lo == 0 || lo > hi {
            return Err(Error::config(format!("invalid ngram_range ({lo}, {hi})")));
        }
        Ok(())
    }
}
