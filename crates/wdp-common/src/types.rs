//! Common types used across WDP

use serde::{Deserialize, Serialize};

/// Checksum algorithm type
///
/// The Wikimedia dump manifests publish MD5 sums, so MD5 is the only
/// algorithm the pipeline currently verifies against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumAlgorithm::Md5 => write!(f, "md5"),
        }
    }
}
