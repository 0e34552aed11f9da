mod common;

use catalog_core::assemble::{assemble, AssembleOptions, NoProgress};
use catalog_core::persist::{deserialize, load_index, load_stats, save_index, serialize, IndexPaths};
use catalog_core::{
    AnalyzerConfig, CorpusIndex, Error, Filters, JournalMeta, SearchEngine, SearchOptions, Vocabulary,
    VocabularyConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use common::{catalog, catalog_engine, loose_config};
use tempfile::tempdir;

/// The three-document corpus: texts indexed verbatim, ISSN on doc2 only.
fn three_doc_engine() -> SearchEngine {
    let texts = ["Physics journal Elsevier", "Chemistry journal Springer", "Physics research Springer"];
    let vocab = Vocabulary::build(&texts, &VocabularyConfig { min_df: 1, max_df: 1.0, ..Default::default() }).unwrap();
    let docs: Vec<(String, JournalMeta)> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let issn = if i == 2 { "1234-5678" } else { "" };
            (t.to_string(), JournalMeta { title: format!("doc{i}"), issn: issn.into(), ..Default::default() })
        })
        .collect();
    let index = assemble(docs, &vocab, AssembleOptions::default(), &mut NoProgress).unwrap();
    SearchEngine::from_parts(vocab, index).unwrap()
}

#[test]
fn physics_query_ranks_physics_documents() {
    let engine = three_doc_engine();
    let results = engine.search("physics", &SearchOptions::new(2).min_score(0.0)).unwrap();
    let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
    assert_eq!(results.len(), 2);
    assert!(positions.contains(&0) && positions.contains(&2));
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[1].rank, 2);
    assert!(results[0].score >= results[1].score);
}

#[test]
fn physics_query_never_returns_unrelated_document() {
    let engine = three_doc_engine();
    let results = engine.search("physics", &SearchOptions::new(10).min_score(0.0)).unwrap();
    assert!(results.iter().all(|r| r.position != 1));
}

#[test]
fn identifier_query_is_exact_lookup() {
    let engine = three_doc_engine();
    let results = engine.search("1234-5678", &SearchOptions::default()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].position, 2);
    assert_eq!(results[0].score, 1.0);

    let compact = engine.search("12345678", &SearchOptions::default()).unwrap();
    assert_eq!(compact, results);
}

#[test]
fn hyphens_and_spaces_are_not_an_identifier() {
    let engine = catalog_engine();
    let results = engine.search("-        -", &SearchOptions::new(20).min_score(0.0)).unwrap();
    assert!(results.is_empty());
}

#[test]
fn unknown_terms_give_no_results() {
    let engine = three_doc_engine();
    let results = engine.search("nonexistent term", &SearchOptions::new(10).min_score(0.5)).unwrap();
    assert!(results.is_empty());
}

#[test]
fn document_text_as_query_scores_one() {
    let engine = three_doc_engine();
    let results = engine.search("Chemistry journal Springer", &SearchOptions::new(3).min_score(0.0)).unwrap();
    assert_eq!(results[0].position, 1);
    assert!((results[0].score - 1.0).abs() < 1e-5);
    assert!(results[1..].iter().all(|r| r.score < results[0].score));
}

#[test]
fn empty_query_is_rejected() {
    let engine = three_doc_engine();
    let err = engine.search("   ", &SearchOptions::default()).unwrap_err();
    assert!(matches!(err, Error::EmptyQuery));
    assert!(err.is_client_error());
}

#[test]
fn invalid_options_are_rejected() {
    let engine = three_doc_engine();
    assert!(matches!(engine.search("physics", &SearchOptions::new(0)), Err(Error::InvalidQuery { .. })));
    assert!(matches!(
        engine.search("physics", &SearchOptions::new(5).min_score(1.5)),
        Err(Error::InvalidQuery { .. })
    ));
}

#[test]
fn min_score_is_not_backfilled() {
    let engine = catalog_engine();
    let all = engine.search("physics", &SearchOptions::new(12).min_score(0.0)).unwrap();
    let (best, worst) = (all[0].score, all[all.len() - 1].score);
    assert!(best > worst);
    let cutoff = (best + worst) / 2.0;
    let strict = engine.search("physics", &SearchOptions::new(12).min_score(cutoff)).unwrap();
    assert!(strict.iter().all(|r| r.score >= cutoff));
    assert!(strict.len() < all.len());
}

#[test]
fn catalog_records_are_searchable() {
    let engine = catalog_engine();
    assert_eq!(engine.stats().total_documents, 12);
    let results = engine.search("organic chemistry", &SearchOptions::new(3).min_score(0.0)).unwrap();
    assert_eq!(results[0].meta.title, "Journal of Organic Chemistry");
    assert_eq!(results[0].meta.external_id, "3");
    assert!(results[0].text.starts_with("Title: Journal of Organic Chemistry"));
}

#[test]
fn filters_apply_after_ranking() {
    let engine = catalog_engine();
    let filters = Filters { publisher: Some("springer".into()), ..Default::default() };
    let results = engine
        .search("physics", &SearchOptions::new(5).min_score(0.0).filters(filters.clone()))
        .unwrap();
    assert!(!results.is_empty());
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.rank, i + 1);
        assert!(filters.accepts(&r.meta));
    }
    assert!(results.iter().any(|r| r.meta.title == "Lecture Notes in Physics"));
}

#[test]
fn filters_combine() {
    let engine = catalog_engine();
    let filters = Filters {
        language: Some("ENG".into()),
        open_access: Some("Full".into()),
        subject_codes: Filters::parse_subject_codes("3100"),
        ..Default::default()
    };
    let results = engine.search("physics", &SearchOptions::new(10).min_score(0.0).filters(filters)).unwrap();
    let titles: Vec<&str> = results.iter().map(|r| r.meta.title.as_str()).collect();
    assert_eq!(titles, vec!["Environmental Physics Letters"]);
}

#[test]
fn filters_also_apply_to_identifier_lookups() {
    let engine = catalog_engine();
    let wrong_type = Filters { source_type: Some("Book Series".into()), ..Default::default() };
    let results = engine.search("1234-5678", &SearchOptions::new(5).filters(wrong_type)).unwrap();
    assert!(results.is_empty());
}

#[test]
fn no_filters_equals_unfiltered_top_k() {
    let engine = catalog_engine();
    let plain = engine.search("letters", &SearchOptions::new(3).min_score(0.0)).unwrap();
    let with_empty = engine
        .search("letters", &SearchOptions::new(3).min_score(0.0).filters(Filters::none()))
        .unwrap();
    assert_eq!(plain, with_empty);
}

#[test]
fn repeated_searches_are_identical() {
    let engine = catalog_engine();
    let opts = SearchOptions::new(8).min_score(0.0);
    let first = engine.search("applied physics letters", &opts).unwrap();
    for _ in 0..5 {
        assert_eq!(engine.search("applied physics letters", &opts).unwrap(), first);
    }
}

#[test]
fn serialized_engine_round_trips() {
    let engine = catalog_engine();
    let bytes = serialize(&engine).unwrap();
    let restored = deserialize(&bytes).unwrap();
    assert_eq!(restored, engine);
    let opts = SearchOptions::new(5).min_score(0.0);
    assert_eq!(restored.search("chemistry", &opts).unwrap(), engine.search("chemistry", &opts).unwrap());
}

#[test]
fn corrupt_bytes_are_rejected() {
    let engine = catalog_engine();
    let mut bytes = serialize(&engine).unwrap();
    assert!(matches!(deserialize(b"nope"), Err(Error::CorruptIndex { .. })));
    bytes[4] = 99;
    assert!(matches!(deserialize(&bytes), Err(Error::CorruptIndex { .. })));
    bytes[4] = catalog_core::persist::FORMAT_VERSION;
    bytes.truncate(bytes.len() / 2);
    assert!(matches!(deserialize(&bytes), Err(Error::CorruptIndex { .. })));
}

/// Field-for-field mirror of the persisted snapshot, for hand-editing bytes.
#[derive(Serialize, Deserialize)]
struct RawVocabulary {
    terms: Vec<String>,
    dictionary: HashMap<String, u32>,
    df: Vec<u32>,
    idf: Vec<f32>,
    num_docs: usize,
    analyzer: AnalyzerConfig,
}

#[derive(Serialize, Deserialize)]
struct RawSnapshot {
    vocab: RawVocabulary,
    index: CorpusIndex,
}

fn reencode(bytes: &[u8], edit: impl FnOnce(&mut RawSnapshot)) -> Vec<u8> {
    let mut snapshot: RawSnapshot = bincode::deserialize(&bytes[5..]).unwrap();
    edit(&mut snapshot);
    let mut out = bytes[..5].to_vec();
    out.extend(bincode::serialize(&snapshot).unwrap());
    out
}

#[test]
fn inconsistent_vocabulary_is_rejected() {
    let engine = catalog_engine();
    let bytes = serialize(&engine).unwrap();
    assert!(deserialize(&reencode(&bytes, |_| {})).is_ok());

    let dangling = reencode(&bytes, |s| {
        s.vocab.dictionary.insert("physics".into(), 999);
    });
    assert!(matches!(deserialize(&dangling), Err(Error::CorruptIndex { .. })));

    let short_idf = reencode(&bytes, |s| {
        s.vocab.idf.pop();
    });
    assert!(matches!(deserialize(&short_idf), Err(Error::CorruptIndex { .. })));
}

#[test]
fn vectors_outside_the_vocabulary_are_rejected() {
    let engine = catalog_engine();
    let bytes = serialize(&engine).unwrap();
    let truncated = reencode(&bytes, |s| {
        if let Some(term) = s.vocab.terms.pop() {
            s.vocab.dictionary.remove(&term);
        }
        s.vocab.df.pop();
        s.vocab.idf.pop();
    });
    assert!(matches!(deserialize(&truncated), Err(Error::CorruptIndex { .. })));
}

#[test]
fn index_saves_and_loads_from_disk() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let engine = catalog_engine();
    let stats = save_index(&paths, &engine, "catalog.jsonl").unwrap();
    assert_eq!(stats.total_documents, 12);
    assert_eq!(load_stats(&paths).unwrap(), stats);
    assert_eq!(load_index(&paths).unwrap(), engine);
}

#[test]
fn missing_index_is_unavailable() {
    let dir = tempdir().unwrap();
    let err = load_index(&IndexPaths::new(dir.path().join("nothing-here"))).unwrap_err();
    assert!(matches!(err, Error::IndexUnavailable { .. }));
}

#[test]
fn min_df_above_corpus_size_is_fatal() {
    let mut config = loose_config(5);
    config.vocabulary.min_df = 13;
    let err = SearchEngine::build(catalog(), &config, &mut NoProgress).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn empty_corpus_is_fatal() {
    let err = SearchEngine::build(Vec::new(), &loose_config(5), &mut NoProgress).unwrap_err();
    assert!(matches!(err, Error::EmptyCorpus));
}

#[test]
fn build_reports_progress_per_chunk() {
    let mut chunks = Vec::new();
    let mut sink = |p: &catalog_core::ChunkProgress| chunks.push(p.documents_done);
    SearchEngine::build(catalog(), &loose_config(5), &mut sink).unwrap();
    assert_eq!(chunks, vec![5, 10, 12]);
}
