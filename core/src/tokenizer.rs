use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","also","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","either","etc","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","will","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Tokenization rules shared by vocabulary building and vectorization.
/// Stored with the vocabulary so queries are analyzed exactly like the
/// documents were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub lowercase: bool,
    /// NFKD-decompose and drop combining marks (`café` -> `cafe`).
    pub strip_accents: bool,
    /// English Snowball stemming of unigrams before n-gram expansion.
    pub stem: bool,
    pub stop_words: bool,
    /// Inclusive (min, max) n-gram lengths.
    pub ngram_range: (usize, usize),
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { lowercase: true, strip_accents: true, stem: false, stop_words: true, ngram_range: (1, 2) }
    }
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn normalize(text: &str, cfg: &AnalyzerConfig) -> String {
    let stripped: String = if cfg.strip_accents {
        text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
    } else {
        text.to_string()
    };
    if cfg.lowercase { stripped.to_lowercase() } else { stripped }
}

/// Split text into unigram tokens: accent stripping, case folding, stop
/// word removal and optional stemming.
pub fn tokenize(text: &str, cfg: &AnalyzerConfig) -> Vec<String> {
    let normalized = normalize(text, cfg);
    let mut tokens = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if cfg.stop_words && is_stopword(&token.to_lowercase()) { continue; }
        if cfg.stem {
            tokens.push(STEMMER.stem(token).into_owned());
        } else {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Terms for indexing: every n-gram in `cfg.ngram_range` over the token
/// sequence, shortest first. Bigrams are joined with a single space.
pub fn analyze(text: &str, cfg: &AnalyzerConfig) -> Vec<String> {
    let tokens = tokenize(text, cfg);
    let (min_n, max_n) = cfg.ngram_range;
    if min_n == 1 && max_n == 1 {
        return tokens;
    }
    let mut terms = Vec::with_capacity(tokens.len() * (max_n - min_n + 1));
    for n in min_n.max(1)..=max_n {
        if n == 1 {
            terms.extend(tokens.iter().cloned());
            continue;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}
