//! Document model for the dump pipeline
//!
//! `RawRecord` is what the dump parser hands us per `<page>` element;
//! `WikiDocument` is the structured, classified, timestamped record the
//! pipeline emits downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Site-level metadata carried from the dump's siteinfo header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub base: String,
    pub generator: String,
    pub site_name: String,
    pub character_case: String,
}

/// One raw record as read from the dump stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub namespace: String,
    pub namespace_code: i32,
    pub revision_id: String,
    pub title: String,
    /// Raw wiki markup, absent for some record kinds
    pub text: Option<String>,
    /// ISO-8601 instant as published in the dump, unvalidated
    pub timestamp: Option<String>,
    pub site_info: SiteInfo,
}

/// An external link extracted from raw wiki markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    /// May be empty when the markup carried a bare URL
    pub description: String,
}

/// Category assigned to a document by the title classification cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WikiCategory {
    Redirect,
    Category,
    List,
    Wikipedia,
    Draft,
    Template,
    File,
    Article,
}

impl WikiCategory {
    pub fn as_str(&self) -> &str {
        match self {
            WikiCategory::Redirect => "redirect",
            WikiCategory::Category => "category",
            WikiCategory::List => "list",
            WikiCategory::Wikipedia => "wikipedia",
            WikiCategory::Draft => "draft",
            WikiCategory::Template => "template",
            WikiCategory::File => "file",
            WikiCategory::Article => "article",
        }
    }
}

/// Fully transformed record, immutable once built
///
/// `wiki_text`, `cleaned_text`, and `links` are populated only when the
/// raw record carried text; `source_timestamp` only when the raw
/// timestamp parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiDocument {
    pub id: String,
    pub namespace: String,
    pub namespace_code: i32,
    pub revision_id: String,
    pub site_info: SiteInfo,
    pub wiki_text: Option<String>,
    pub cleaned_text: Option<String>,
    pub links: Vec<Link>,
    pub source_timestamp: Option<DateTime<Utc>>,
    /// Raw timestamp string as published in the dump (empty when absent)
    pub dump_timestamp: String,
    pub title: String,
    pub category: WikiCategory,
    pub processed_at: DateTime<Utc>,
}
