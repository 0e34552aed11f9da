#![allow(dead_code)]

use catalog_core::extract::{
    ACTIVE_STATUS, ASJC_CODES, COVERAGE, EISSN, ISSN, LANGUAGE, OPEN_ACCESS, PUBLISHER, SOURCERECORD_ID,
    SOURCE_TITLE, SOURCE_TYPE,
};
use catalog_core::{BuildConfig, NoProgress, Record, SearchEngine, VocabularyConfig};

/// Build config that keeps every term, for corpora too small for the
/// production frequency band.
pub fn loose_config(chunk_size: usize) -> BuildConfig {
    BuildConfig {
        vocabulary: VocabularyConfig { min_df: 1, max_df: 1.0, ..Default::default() },
        chunk_size,
        parallel: false,
    }
}

pub fn journal(id: u32, title: &str, publisher: &str, kind: &str, issn: &str, codes: &str, lang: &str, oa: &str) -> Record {
    Record::new()
        .with(SOURCERECORD_ID, id as i64)
        .with(SOURCE_TITLE, title)
        .with(PUBLISHER, publisher)
        .with(SOURCE_TYPE, kind)
        .with(ISSN, issn)
        .with(EISSN, "")
        .with(ACTIVE_STATUS, "Active")
        .with(COVERAGE, "2000-2025")
        .with(ASJC_CODES, codes)
        .with(LANGUAGE, lang)
        .with(OPEN_ACCESS, oa)
}

/// A dozen journals across a few fields and publishers.
pub fn catalog() -> Vec<Record> {
    vec![
        journal(1, "Journal of Applied Physics", "AIP Publishing", "Journal", "0021-8979", "3100", "ENG", ""),
        journal(2, "Physical Review Letters", "American Physical Society", "Journal", "0031-9007", "3100", "ENG", ""),
        journal(3, "Journal of Organic Chemistry", "American Chemical Society", "Journal", "0022-3263", "1605", "ENG", ""),
        journal(4, "Chemistry Letters", "Oxford University Press", "Journal", "0366-7022", "1600", "ENG", ""),
        journal(5, "Molecular Biology Reports", "Springer Nature", "Journal", "0301-4851", "1312; 1311", "ENG", "Hybrid"),
        journal(6, "Revue de Physique Appliquee", "EDP Sciences", "Journal", "0035-1687", "3100", "FRE", "Full"),
        journal(7, "Lecture Notes in Physics", "Springer Nature", "Book Series", "0075-8450", "3100", "ENG", ""),
        journal(8, "Computational Chemistry Methods", "Elsevier", "Journal", "1234-5678", "1606; 1703", "ENG", "Gold"),
        journal(9, "Climate Dynamics", "Springer Nature", "Journal", "0930-7575", "1902", "ENG", "Hybrid"),
        journal(10, "Environmental Physics Letters", "IOP Publishing", "Journal", "1748-9326", "2300; 3100", "ENG", "Full"),
        journal(11, "Annals of Mathematics", "Princeton University", "Journal", "0003-486X", "2600", "ENG", ""),
        journal(12, "Applied Physics Express", "IOP Publishing", "Journal", "1882-0778", "3100", "ENG", ""),
    ]
}

pub fn catalog_engine() -> SearchEngine {
    SearchEngine::build(catalog(), &loose_config(5), &mut NoProgress).unwrap()
}
