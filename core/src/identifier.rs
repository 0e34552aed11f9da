//! ISSN-style exact lookup.
//!
//! A query that looks like an 8-character identifier skips vectorization
//! and is matched directly against each document's ISSN and EISSN.

use crate::index::{CorpusIndex, JournalMeta};
use crate::rank::Scored;

/// Score given to every identifier match.
pub const EXACT_MATCH_SCORE: f32 = 1.0;

fn strip(s: &str, also_whitespace: bool) -> String {
    s.chars().filter(|c| *c != '-' && !(also_whitespace && c.is_whitespace())).collect()
}

/// True when the query has hyphens and whitespace removed is 8 ASCII
/// digits, or when it contains a hyphen and is 8 characters without it
/// (`"1234-567X"`).
///
/// Any 8-digit free-text query (e.g. `"19902000"`) is taken as an
/// identifier too. Queries of only hyphens and whitespace are not, since
/// the empty compact form would match every ISSN.
pub fn is_identifier_query(query: &str) -> bool {
    let compact = strip(query, true);
    if compact.is_empty() {
        return false;
    }
    if compact.chars().count() == 8 && compact.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    query.contains('-') && strip(query, false).chars().count() == 8
}

fn matches(query: &str, compact: &str, meta: &JournalMeta) -> bool {
    [&meta.issn, &meta.eissn].into_iter().any(|field| {
        !field.is_empty() && (strip(field, false).contains(compact) || field.contains(query))
    })
}

/// Documents whose ISSN or EISSN contains the identifier, in corpus order,
/// at most `top_k` of them.
pub fn match_identifier(query: &str, index: &CorpusIndex, top_k: usize) -> Vec<Scored> {
    let compact = strip(query, true);
    index
        .documents()
        .iter()
        .filter(|doc| matches(query, &compact, &doc.meta))
        .take(top_k)
        .map(|doc| Scored { position: doc.position, score: EXACT_MATCH_SCORE })
        .collect()
}
