//! Index sink boundary
//!
//! The writer sees the sink as two calls: a bulk write of
//! one batch, then a commit. The shipped implementation talks to a
//! Solr-style HTTP endpoint; the wire schema of the index product is
//! not this crate's concern.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::document::WikiDocument;

/// Errors surfaced by index sink operations
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("index request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("index returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Bulk-write-then-commit boundary to the search index
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Write one batch as a single bulk operation
    async fn bulk_write(&self, batch: &[WikiDocument]) -> Result<(), SinkError>;

    /// Make previously written documents visible
    async fn commit(&self) -> Result<(), SinkError>;
}

/// HTTP sink for a Solr-style index endpoint
///
/// The HTTP client is built per call, so the connection is scoped to
/// one flush and a long idle period holds no resource open.
pub struct SolrHttpSink {
    base_url: String,
    collection: String,
    request_timeout: Duration,
}

impl SolrHttpSink {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            request_timeout,
        }
    }

    fn client(&self) -> Result<reqwest::Client, SinkError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }

    fn update_url(&self) -> String {
        format!(
            "{}/{}/update",
            self.base_url.trim_end_matches('/'),
            self.collection
        )
    }

    async fn check_status(response: reqwest::Response) -> Result<(), SinkError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl IndexSink for SolrHttpSink {
    async fn bulk_write(&self, batch: &[WikiDocument]) -> Result<(), SinkError> {
        debug!(documents = batch.len(), collection = %self.collection, "bulk write");

        let response = self
            .client()?
            .post(self.update_url())
            .json(batch)
            .send()
            .await?;

        Self::check_status(response).await
    }

    async fn commit(&self) -> Result<(), SinkError> {
        let response = self
            .client()?
            .get(format!("{}?commit=true", self.update_url()))
            .send()
            .await?;

        Self::check_status(response).await
    }
}
