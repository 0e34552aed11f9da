//! Record -> (index text, metadata).

use crate::index::JournalMeta;
use crate::record::{Lookup, Record};

pub const SOURCE_TITLE: &str = "Source Title";
pub const PUBLISHER: &str = "Publisher";
pub const SOURCE_TYPE: &str = "Source Type";
pub const ASJC_CODES: &str = "All Science Journal Classification Codes (ASJC)";
pub const COVERAGE: &str = "Coverage";
pub const OPEN_ACCESS: &str = "Open Access Status";
pub const LANGUAGE: &str = "Article Language in Source (Three-Letter ISO Language Codes)";
pub const ISSN: &str = "ISSN";
pub const EISSN: &str = "EISSN";
pub const ACTIVE_STATUS: &str = "Active or Inactive";
pub const SOURCERECORD_ID: &str = "Sourcerecord ID";

/// Fields that make up the index text, in order, with their labels.
const TEXT_FIELDS: &[(&str, &str)] = &[
    (SOURCE_TITLE, "Title"),
    (PUBLISHER, "Publisher"),
    (SOURCE_TYPE, "Type"),
    (ASJC_CODES, "Subject Areas"),
    (COVERAGE, "Coverage"),
    (OPEN_ACCESS, "Open Access"),
    (LANGUAGE, "Language"),
];

/// Title-like fields tried, in order, when nothing else yields text.
const FALLBACK_TITLES: &[&str] = &[
    SOURCE_TITLE,
    "Related Title 1",
    "Other Related Title 2",
    "Other Related Title 3",
    "Other Related Title 4",
];

pub const SEPARATOR: &str = " | ";
pub const NO_INFORMATION: &str = "No information available";

/// Build the index text and metadata for one record. Never fails: missing
/// fields are omitted and malformed ones are skipped with a warning.
pub fn extract(record: &Record) -> (String, JournalMeta) {
    (extract_text(record), extract_meta(record))
}

pub fn extract_text(record: &Record) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(TEXT_FIELDS.len());
    for (field, label) in TEXT_FIELDS {
        match record.lookup(field) {
            Lookup::Value(v) => parts.push(format!("{label}: {v}")),
            Lookup::Missing => {}
            Lookup::Malformed(raw) => {
                tracing::warn!(field = *field, value = %raw, "skipping non-scalar field");
            }
        }
    }
    if !parts.is_empty() {
        return parts.join(SEPARATOR);
    }
    FALLBACK_TITLES
        .iter()
        .find_map(|f| match record.lookup(f) {
            Lookup::Value(v) => Some(format!("Title: {v}")),
            _ => None,
        })
        .unwrap_or_else(|| NO_INFORMATION.to_string())
}

pub fn extract_meta(record: &Record) -> JournalMeta {
    JournalMeta {
        title: record.get_or_default(SOURCE_TITLE),
        publisher: record.get_or_default(PUBLISHER),
        source_type: record.get_or_default(SOURCE_TYPE),
        issn: record.get_or_default(ISSN),
        eissn: record.get_or_default(EISSN),
        open_access: record.get_or_default(OPEN_ACCESS),
        active_status: record.get_or_default(ACTIVE_STATUS),
        coverage: record.get_or_default(COVERAGE),
        subject_codes: split_codes(&record.get_or_default(ASJC_CODES)),
        language: record.get_or_default(LANGUAGE),
        external_id: record.get_or_default(SOURCERECORD_ID),
    }
}

fn split_codes(raw: &str) -> std::collections::BTreeSet<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> Record {
        Record::new()
            .with(SOURCERECORD_ID, 21100.0)
            .with(SOURCE_TITLE, "Journal of Applied Physics")
            .with(ISSN, "0021-8979")
            .with(EISSN, "1089-7550")
            .with(PUBLISHER, "AIP Publishing")
            .with(SOURCE_TYPE, "Journal")
            .with(ACTIVE_STATUS, "Active")
            .with(COVERAGE, "1937-2025")
            .with(OPEN_ACCESS, "")
            .with(LANGUAGE, "ENG")
            .with(ASJC_CODES, "3100; 2500 ;")
    }

    #[test]
    fn text_skips_empty_fields() {
        let (text, _) = extract(&full_record());
        assert_eq!(
            text,
            "Title: Journal of Applied Physics | Publisher: AIP Publishing | Type: Journal \
             | Subject Areas: 3100; 2500 ; | Coverage: 1937-2025 | Language: ENG"
        );
        assert!(!text.contains("Open Access"));
    }

    #[test]
    fn meta_is_canonical() {
        let (_, meta) = extract(&full_record());
        assert_eq!(meta.external_id, "21100");
        assert_eq!(meta.open_access, "");
        assert_eq!(meta.eissn, "1089-7550");
        let codes: Vec<&str> = meta.subject_codes.iter().map(String::as_str).collect();
        assert_eq!(codes, vec!["2500", "3100"]);
    }

    #[test]
    fn malformed_record_degrades_to_title() {
        let record: Record = serde_json::from_str(
            r#"{"Related Title 1": "Old Physics Letters", "Publisher": {"name": "x"}}"#,
        )
        .unwrap();
        let (text, meta) = extract(&record);
        assert_eq!(text, "Title: Old Physics Letters");
        assert_eq!(meta.publisher, "");
    }

    #[test]
    fn empty_record_has_placeholder_text() {
        let (text, meta) = extract(&Record::new());
        assert_eq!(text, NO_INFORMATION);
        assert_eq!(meta, JournalMeta::default());
    }
}
