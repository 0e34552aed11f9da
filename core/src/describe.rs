//! Two-sentence plain-language summary of a journal's metadata.

use crate::index::JournalMeta;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"[0-9]{4}").expect("valid regex");
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn coverage_span(coverage: &str) -> Option<String> {
    let years: Vec<&str> = YEAR.find_iter(coverage).map(|m| m.as_str()).collect();
    match years.as_slice() {
        [] => None,
        [only] => Some(format!("since {only}")),
        [first, .., last] => Some(format!("from {first} to {last}")),
    }
}

pub fn describe(meta: &JournalMeta) -> String {
    let title = or_default(&meta.title, "Unknown Journal");
    let publisher = or_default(&meta.publisher, "Unknown Publisher");
    let kind = or_default(&meta.source_type, "Journal").to_lowercase();

    let first = if kind == "journal" {
        format!("{title} is a scholarly journal published by {publisher}.")
    } else {
        format!("{title} is a {kind} published by {publisher}.")
    };

    let mut parts: Vec<String> = Vec::new();
    match meta.active_status.to_lowercase().as_str() {
        "active" => parts.push("currently active".into()),
        "inactive" => parts.push("no longer active".into()),
        _ => {}
    }
    if let Some(span) = coverage_span(&meta.coverage) {
        parts.push(format!("with coverage {span}"));
    }
    match meta.open_access.to_lowercase().as_str() {
        "full" => parts.push("offering full open access".into()),
        "hybrid" => parts.push("offering hybrid open access".into()),
        _ => {}
    }

    let second = if parts.is_empty() {
        "This publication provides academic content in its field of study.".to_string()
    } else {
        format!("This publication is {}.", parts.join(", "))
    };
    format!("{first} {second}")
}
