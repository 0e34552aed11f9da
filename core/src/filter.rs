use crate::index::{CorpusIndex, JournalMeta};
use crate::rank::Scored;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimum number of candidates fetched when any filter is active.
pub const MIN_OVERFETCH: usize = 100;
pub const OVERFETCH_FACTOR: usize = 3;

/// Post-retrieval constraints, all optional and combined with AND. Blank
/// strings and empty sets impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Case-insensitive substring of the publisher.
    pub publisher: Option<String>,
    /// Exact source type, e.g. "Journal" or "Book Series".
    #[serde(alias = "type")]
    pub source_type: Option<String>,
    /// Must occur in the open-access status text.
    pub open_access: Option<String>,
    /// At least one of these ASJC codes.
    pub subject_codes: BTreeSet<String>,
    /// Exact three-letter language code.
    pub language: Option<String>,
}

fn active(clause: &Option<String>) -> Option<&str> {
    clause.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Filters {
    pub fn none() -> Self { Self::default() }

    /// Parse a comma-separated ASJC code list.
    pub fn parse_subject_codes(raw: &str) -> BTreeSet<String> {
        raw.split(',').map(str::trim).filter(|c| !c.is_empty()).map(str::to_string).collect()
    }

    pub fn is_active(&self) -> bool {
        active(&self.publisher).is_some()
            || active(&self.source_type).is_some()
            || active(&self.open_access).is_some()
            || !self.subject_codes.is_empty()
            || active(&self.language).is_some()
    }

    /// How many candidates to ask the ranker for so that, after filtering,
    /// `top_k` survivors are likely.
    pub fn fetch_limit(&self, top_k: usize) -> usize {
        if self.is_active() {
            top_k.saturating_mul(OVERFETCH_FACTOR).max(MIN_OVERFETCH)
        } else {
            top_k
        }
    }

    pub fn accepts(&self, meta: &JournalMeta) -> bool {
        if let Some(p) = active(&self.publisher) {
            if !meta.publisher.to_lowercase().contains(&p.to_lowercase()) {
                return false;
            }
        }
        if let Some(t) = active(&self.source_type) {
            if meta.source_type != t {
                return false;
            }
        }
        if let Some(oa) = active(&self.open_access) {
            if !meta.open_access.contains(oa) {
                return false;
            }
        }
        if !self.subject_codes.is_empty() && self.subject_codes.is_disjoint(&meta.subject_codes) {
            return false;
        }
        if let Some(lang) = active(&self.language) {
            if meta.language != lang {
                return false;
            }
        }
        true
    }
}

/// Keep candidates accepted by `filters`, in order, stopping at `top_k`.
pub fn filter<I>(candidates: I, filters: &Filters, index: &CorpusIndex, top_k: usize) -> Vec<Scored>
where
    I: IntoIterator<Item = Scored>,
{
    if !filters.is_active() {
        return candidates.into_iter().take(top_k).collect();
    }
    candidates
        .into_iter()
        .filter(|c| index.document(c.position).is_some_and(|d| filters.accepts(&d.meta)))
        .take(top_k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> JournalMeta {
        JournalMeta {
            publisher: "Springer Nature".into(),
            source_type: "Journal".into(),
            open_access: "Unpaywall Open Access; Gold".into(),
            subject_codes: ["1706".to_string(), "2604".to_string()].into_iter().collect(),
            language: "ENG".into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_filters_accept_everything() {
        let f = Filters { publisher: Some("  ".into()), ..Default::default() };
        assert!(!f.is_active());
        assert!(f.accepts(&JournalMeta::default()));
        assert_eq!(f.fetch_limit(10), 10);
    }

    #[test]
    fn clauses_are_conjunctive() {
        let m = meta();
        let publisher = Filters { publisher: Some("springer".into()), ..Default::default() };
        assert!(publisher.accepts(&m));
        let both = Filters { language: Some("FRE".into()), ..publisher.clone() };
        assert!(!both.accepts(&m));
        let oa = Filters { open_access: Some("Gold".into()), ..Default::default() };
        assert!(oa.accepts(&m));
        let kind = Filters { source_type: Some("Book Series".into()), ..Default::default() };
        assert!(!kind.accepts(&m));
    }

    #[test]
    fn subject_codes_intersect() {
        let m = meta();
        let hit = Filters { subject_codes: Filters::parse_subject_codes("9999, 2604"), ..Default::default() };
        assert!(hit.accepts(&m));
        let miss = Filters { subject_codes: Filters::parse_subject_codes("9999"), ..Default::default() };
        assert!(!miss.accepts(&m));
    }

    #[test]
    fn overfetch_limit() {
        let f = Filters { language: Some("ENG".into()), ..Default::default() };
        assert_eq!(f.fetch_limit(10), 100);
        assert_eq!(f.fetch_limit(50), 150);
    }

    #[test]
    fn deserializes_type_alias() {
        let f: Filters = serde_json::from_str(r#"{"type": "Journal"}"#).unwrap();
        assert_eq!(f.source_type.as_deref(), Some("Journal"));
    }
}
