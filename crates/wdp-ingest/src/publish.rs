//! Structured document publish boundary
//!
//! Transformed documents are handed to a message-bus publisher keyed by
//! a fresh v4 UUID per document. Delivery ordering and acknowledgment
//! semantics belong to the bus client, not this crate.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::document::WikiDocument;

/// Message-bus publish capability (external collaborator)
#[async_trait]
pub trait DocumentPublisher: Send + Sync {
    /// Publish one document under the given key
    async fn publish(&self, key: Uuid, document: &WikiDocument) -> anyhow::Result<()>;
}

/// Publisher that only logs, for local runs and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPublisher;

#[async_trait]
impl DocumentPublisher for LoggingPublisher {
    async fn publish(&self, key: Uuid, document: &WikiDocument) -> anyhow::Result<()> {
        debug!(%key, id = %document.id, title = %document.title, "publishing document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{SiteInfo, WikiCategory};
    use chrono::Utc;

    #[tokio::test]
    async fn test_logging_publisher_accepts_document() {
        let doc = WikiDocument {
            id: "1".into(),
            namespace: "Main".into(),
            namespace_code: 0,
            revision_id: "1".into(),
            site_info: SiteInfo::default(),
            wiki_text: None,
            cleaned_text: None,
            links: vec![],
            source_timestamp: None,
            dump_timestamp: String::new(),
            title: "T".into(),
            category: WikiCategory::Article,
            processed_at: Utc::now(),
        };

        LoggingPublisher.publish(Uuid::new_v4(), &doc).await.unwrap();
    }
}
