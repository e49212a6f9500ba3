//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the dump ingestion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Well-known URL of the dump checksum manifest
    pub manifest_url: String,

    /// URL prefix the resolved artifact URLs are built from
    pub prefix_url: String,

    /// Path of a locally cached manifest, tried before the network
    pub cache_path: String,

    /// Capacity of the bounded document queue (producers block when full)
    pub queue_capacity: usize,

    /// Batch size that forces an immediate flush
    pub high_water_mark: usize,

    /// Seconds the consumer waits for the next document before an
    /// idle-triggered flush
    pub poll_timeout_secs: u64,

    /// Consecutive flush failures tolerated before the batch is dropped
    pub max_flush_attempts: u32,

    /// HTTP timeout for manifest fetches and index writes
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            manifest_url: "https://dumps.wikimedia.org/enwiki/latest/enwiki-latest-md5sums.txt"
                .to_string(),
            prefix_url: "https://dumps.wikimedia.org/enwiki/".to_string(),
            cache_path: "./data/enwiki-latest-md5sums.txt".to_string(),
            queue_capacity: 22_000,
            high_water_mark: 20_000,
            poll_timeout_secs: 5,
            max_flush_attempts: 3,
            request_timeout_secs: 300,
        }
    }
}

impl PipelineConfig {
    /// Create new config with builder pattern
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Poll timeout as a `Duration`
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = PipelineConfig::default();

        PipelineConfig {
            manifest_url: std::env::var("WDP_MANIFEST_URL").unwrap_or(defaults.manifest_url),
            prefix_url: std::env::var("WDP_PREFIX_URL").unwrap_or(defaults.prefix_url),
            cache_path: std::env::var("WDP_CACHE_PATH").unwrap_or(defaults.cache_path),
            queue_capacity: std::env::var("WDP_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.queue_capacity),
            high_water_mark: std::env::var("WDP_HIGH_WATER_MARK")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.high_water_mark),
            poll_timeout_secs: std::env::var("WDP_POLL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.poll_timeout_secs),
            max_flush_attempts: std::env::var("WDP_MAX_FLUSH_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_flush_attempts),
            request_timeout_secs: std::env::var("WDP_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.manifest_url.is_empty() {
            return Err("Manifest URL cannot be empty".to_string());
        }
        if self.prefix_url.is_empty() {
            return Err("Prefix URL cannot be empty".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be greater than 0".to_string());
        }
        if self.high_water_mark == 0 {
            return Err("High-water mark must be greater than 0".to_string());
        }
        if self.high_water_mark > self.queue_capacity {
            return Err("High-water mark cannot exceed queue capacity".to_string());
        }
        if self.poll_timeout_secs == 0 {
            return Err("Poll timeout must be greater than 0".to_string());
        }
        if self.max_flush_attempts == 0 {
            return Err("Max flush attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    manifest_url: Option<String>,
    prefix_url: Option<String>,
    cache_path: Option<String>,
    queue_capacity: Option<usize>,
    high_water_mark: Option<usize>,
    poll_timeout_secs: Option<u64>,
    max_flush_attempts: Option<u32>,
    request_timeout_secs: Option<u64>,
}

impl PipelineConfigBuilder {
    pub fn manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = Some(url.into());
        self
    }

    pub fn prefix_url(mut self, url: impl Into<String>) -> Self {
        self.prefix_url = Some(url.into());
        self
    }

    pub fn cache_path(mut self, path: impl Into<String>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn high_water_mark(mut self, mark: usize) -> Self {
        self.high_water_mark = Some(mark);
        self
    }

    pub fn poll_timeout_secs(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = Some(secs);
        self
    }

    pub fn max_flush_attempts(mut self, attempts: u32) -> Self {
        self.max_flush_attempts = Some(attempts);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();

        PipelineConfig {
            manifest_url: self.manifest_url.unwrap_or(defaults.manifest_url),
            prefix_url: self.prefix_url.unwrap_or(defaults.prefix_url),
            cache_path: self.cache_path.unwrap_or(defaults.cache_path),
            queue_capacity: self.queue_capacity.unwrap_or(defaults.queue_capacity),
            high_water_mark: self.high_water_mark.unwrap_or(defaults.high_water_mark),
            poll_timeout_secs: self.poll_timeout_secs.unwrap_or(defaults.poll_timeout_secs),
            max_flush_attempts: self.max_flush_attempts.unwrap_or(defaults.max_flush_attempts),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}
