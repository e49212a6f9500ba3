//! Per-record transformation: raw dump record -> structured document
//!
//! Transformation never fails a record outright; a sub-step failure
//! (unparseable timestamp, skipped link candidate) degrades to omission
//! of the affected field and the record continues.

use chrono::{DateTime, Utc};
use tracing::error;

use crate::document::{RawRecord, WikiCategory, WikiDocument};
use crate::links::extract_links;

/// External text-cleaning capability (black box to this crate)
pub trait TextCleaner: Send + Sync {
    /// Produce plain text from raw wiki markup
    fn clean(&self, wiki_text: &str) -> String;
}

/// Cleaner that passes markup through untouched
///
/// Stand-in for environments without a markup-cleaning service; also
/// used in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCleaner;

impl TextCleaner for PassthroughCleaner {
    fn clean(&self, wiki_text: &str) -> String {
        wiki_text.to_string()
    }
}

/// Ordered classification cascade: first matching rule wins
///
/// The contains-REDIRECT rule deliberately precedes every prefix rule,
/// so a title like `Category:REDIRECT to Foo` classifies as Redirect.
const CLASSIFIERS: &[(fn(&str) -> bool, WikiCategory)] = &[
    (|t| t.contains("REDIRECT"), WikiCategory::Redirect),
    (|t| t.starts_with("Category:"), WikiCategory::Category),
    (|t| t.starts_with("List of"), WikiCategory::List),
    (|t| t.starts_with("Wikipedia:"), WikiCategory::Wikipedia),
    (|t| t.starts_with("Draft:"), WikiCategory::Draft),
    (|t| t.starts_with("Template:"), WikiCategory::Template),
    (|t| t.starts_with("File:"), WikiCategory::File),
];

/// Classify a title; defaults to Article when no rule matches
pub fn classify_title(title: &str) -> WikiCategory {
    CLASSIFIERS
        .iter()
        .find(|(predicate, _)| predicate(title))
        .map(|(_, category)| *category)
        .unwrap_or(WikiCategory::Article)
}

/// Converts one raw record into one structured document
pub struct RecordTransformer<C: TextCleaner> {
    cleaner: C,
}

impl<C: TextCleaner> RecordTransformer<C> {
    pub fn new(cleaner: C) -> Self {
        Self { cleaner }
    }

    /// Transform a raw record; never fails, sub-step failures degrade
    /// to field omission
    pub fn transform(&self, raw: RawRecord) -> WikiDocument {
        let (wiki_text, cleaned_text, links) = match &raw.text {
            Some(text) => (
                Some(text.clone()),
                Some(self.cleaner.clean(text)),
                extract_links(text),
            ),
            None => (None, None, Vec::new()),
        };

        let source_timestamp = raw.timestamp.as_deref().and_then(parse_source_timestamp);

        WikiDocument {
            id: raw.id,
            namespace: raw.namespace,
            namespace_code: raw.namespace_code,
            revision_id: raw.revision_id,
            site_info: raw.site_info,
            wiki_text,
            cleaned_text,
            links,
            source_timestamp,
            dump_timestamp: raw.timestamp.unwrap_or_default(),
            category: classify_title(&raw.title),
            title: raw.title,
            processed_at: Utc::now(),
        }
    }
}

/// Parse the dump's ISO-8601 instant; omission on failure, never abort
fn parse_source_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => Some(instant.with_timezone(&Utc)),
        Err(e) => {
            error!(timestamp = raw, error = %e, "illegal format for record timestamp");
            None
        },
    }
}
