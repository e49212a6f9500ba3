//! Manifest source resolution
//!
//! Resolution order for the manifest text, per the release tooling's
//! conventions:
//!
//! 1. bundled resource named by the explicit argument (ships with the
//!    binary, useful for replays and tests),
//! 2. filesystem lookup of the same argument path,
//! 3. locally cached manifest at the configured path,
//! 4. network fetch of the well-known manifest URL.

use include_dir::{include_dir, Dir};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;

/// Manifests packaged with the binary
static BUNDLED_MANIFESTS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Errors surfaced by manifest loading
///
/// Only reachable once every fallback step has been exhausted.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("manifest fetch failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Loads manifest text through the bundled/filesystem/cache/network chain
pub struct ManifestSource {
    manifest_url: String,
    cache_path: PathBuf,
    request_timeout: Duration,
}

impl ManifestSource {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            manifest_url: config.manifest_url.clone(),
            cache_path: PathBuf::from(&config.cache_path),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Load manifest text, trying each source in resolution order
    pub async fn load(&self, explicit: Option<&str>) -> Result<String, SourceError> {
        if let Some(name) = explicit {
            if let Some(text) = Self::bundled(name) {
                info!(name, "loaded bundled manifest");
                return Ok(text);
            }
            match tokio::fs::read_to_string(name).await {
                Ok(text) => {
                    info!(path = name, "loaded manifest from file");
                    return Ok(text);
                },
                Err(e) => {
                    warn!(path = name, error = %e, "explicit manifest path did not resolve");
                },
            }
        }

        match tokio::fs::read_to_string(&self.cache_path).await {
            Ok(text) => {
                info!(path = %self.cache_path.display(), "loaded cached manifest");
                return Ok(text);
            },
            Err(e) => {
                debug!(path = %self.cache_path.display(), error = %e, "no cached manifest");
            },
        }

        self.fetch().await
    }

    fn bundled(name: &str) -> Option<String> {
        BUNDLED_MANIFESTS
            .get_file(name)
            .and_then(|file| file.contents_utf8())
            .map(str::to_string)
    }

    async fn fetch(&self) -> Result<String, SourceError> {
        info!(url = %self.manifest_url, "fetching manifest");

        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?;
        let text = client
            .get(&self.manifest_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(text)
    }
}
