//! Dump manifest parsing and download descriptor resolution
//!
//! A manifest is the checksum listing published with each dump release:
//! one `"<md5><two spaces><filename>"` record per line. Resolution
//! filters the listing by file-type policy (multistream preferred over
//! plain article dumps, never mixed) and builds one download
//! descriptor per qualifying entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use wdp_common::types::ChecksumAlgorithm;

/// Separator between checksum and filename in a manifest line
const FIELD_SEPARATOR: &str = "  ";

/// Markers delimiting the dump date inside a dump filename
const DATE_START_MARKER: &str = "enwiki-";
const DATE_END_MARKER: &str = "-pages";

/// Errors surfaced by manifest resolution
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Every file-type policy in the preference order matched nothing.
    /// Terminal for the resolution call; whether the process exits is
    /// the outermost caller's decision.
    #[error("no qualifying dump files found for any file type policy")]
    NoQualifyingEntries,
}

/// Dump packaging policies, mutually exclusive per resolution run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WikiFileType {
    Multistream,
    Article,
}

impl WikiFileType {
    /// Default preference order: multistream, then plain article dumps
    pub const DEFAULT_ORDER: [WikiFileType; 2] =
        [WikiFileType::Multistream, WikiFileType::Article];

    fn matches(&self, filename: &str) -> bool {
        match self {
            WikiFileType::Multistream => {
                filename.contains("pages-articles-multistream")
                    && !filename.contains("pages-articles-multistream.xml.bz2")
                    && !filename.contains("index")
            },
            WikiFileType::Article => {
                filename.contains("pages-article")
                    && !filename.contains("pages-articles.xml.bz2")
            },
        }
    }
}

/// One parsed manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub checksum: String,
    pub filename: String,
}

/// Everything an external downloader needs to fetch one dump artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    pub checksum: String,
    pub checksum_algorithm: ChecksumAlgorithm,
    pub filename: String,
    pub dump_date: String,
    pub resolved_url: String,
}

/// Parse manifest text into entries, skipping malformed lines
///
/// A line must split into exactly two fields on the two-space
/// separator; anything else is dropped. Skips are logged at debug so
/// the loss stays observable.
pub fn parse_manifest(manifest_text: &str) -> Vec<ManifestEntry> {
    manifest_text
        .lines()
        .filter_map(|line| {
            if line.is_empty() {
                return None;
            }
            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            if fields.len() != 2 {
                debug!(field_count = fields.len(), line, "skipping malformed manifest line");
                return None;
            }
            Some(ManifestEntry {
                checksum: fields[0].to_string(),
                filename: fields[1].to_string(),
            })
        })
        .collect()
}

/// Extract the dump date from a dump filename
///
/// The date is the substring strictly between `enwiki-` and `-pages`,
/// e.g. `enwiki-20230101-pages-articles-multistream.xml.bz2` yields
/// `20230101`.
pub fn parse_dump_date(filename: &str) -> Option<&str> {
    let start = filename.find(DATE_START_MARKER)? + DATE_START_MARKER.len();
    let end = filename[start..].find(DATE_END_MARKER)? + start;
    Some(&filename[start..end])
}

/// Resolve manifest text into download descriptors
///
/// Tries each file-type policy in order and keeps the first one whose
/// filtered entry set is non-empty; results are never merged across
/// policies. Entries without a derivable dump date are dropped.
pub fn resolve(
    manifest_text: &str,
    prefix_url: &str,
    preference_order: &[WikiFileType],
) -> Result<Vec<DownloadDescriptor>, ManifestError> {
    let entries = parse_manifest(manifest_text);

    for file_type in preference_order {
        let matching: Vec<&ManifestEntry> = entries
            .iter()
            .filter(|e| file_type.matches(&e.filename))
            .collect();

        if matching.is_empty() {
            debug!(?file_type, "no manifest entries for file type, trying next policy");
            continue;
        }

        let descriptors: Vec<DownloadDescriptor> = matching
            .into_iter()
            .filter_map(|entry| {
                let Some(dump_date) = parse_dump_date(&entry.filename) else {
                    debug!(filename = %entry.filename, "entry has no derivable dump date, dropping");
                    return None;
                };
                Some(DownloadDescriptor {
                    checksum: entry.checksum.clone(),
                    checksum_algorithm: ChecksumAlgorithm::Md5,
                    filename: entry.filename.clone(),
                    dump_date: dump_date.to_string(),
                    resolved_url: format!("{}{}/{}", prefix_url, dump_date, entry.filename),
                })
            })
            .collect();

        return Ok(descriptors);
    }

    Err(ManifestError::NoQualifyingEntries)
}
