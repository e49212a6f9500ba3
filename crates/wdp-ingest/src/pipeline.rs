//! Dump pipeline orchestration
//!
//! Ties the stages together: manifest resolution for the caller-driven
//! download step, then record transformation feeding the batched index
//! writer through the bounded queue.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::document::RawRecord;
use crate::indexer::{BatchedIndexWriter, WriterConfig, WriterStats};
use crate::manifest::{self, DownloadDescriptor, WikiFileType};
use crate::publish::DocumentPublisher;
use crate::sink::IndexSink;
use crate::source::ManifestSource;
use crate::transform::{RecordTransformer, TextCleaner};

/// End-to-end dump ingestion pipeline
pub struct DumpPipeline<C: TextCleaner> {
    config: PipelineConfig,
    transformer: RecordTransformer<C>,
}

impl<C: TextCleaner> DumpPipeline<C> {
    pub fn new(config: PipelineConfig, cleaner: C) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid pipeline configuration: {}", e))?;

        Ok(Self {
            config,
            transformer: RecordTransformer::new(cleaner),
        })
    }

    /// Resolve the manifest into download descriptors
    ///
    /// `explicit` names a bundled or filesystem manifest to prefer over
    /// the cache/network chain. Downloading the described artifacts is
    /// the caller's concern.
    pub async fn resolve_descriptors(
        &self,
        explicit: Option<&str>,
    ) -> Result<Vec<DownloadDescriptor>> {
        info!("Step 1/2: Loading dump manifest...");
        let source = ManifestSource::new(&self.config);
        let manifest_text = source
            .load(explicit)
            .await
            .context("Failed to load manifest")?;

        info!("Step 2/2: Resolving download descriptors...");
        let descriptors = manifest::resolve(
            &manifest_text,
            &self.config.prefix_url,
            &WikiFileType::DEFAULT_ORDER,
        )?;

        info!(files = descriptors.len(), "manifest resolved");
        Ok(descriptors)
    }

    /// Run raw records through transformation into the index writer
    ///
    /// Each transformed document is published to the message bus and
    /// enqueued for indexing; the enqueue blocks when the queue is full
    /// (backpressure). Cancelling `shutdown` stops the writer after a
    /// drain; on normal completion the writer finishes once the queue
    /// empties.
    pub async fn run<S, P, I>(
        &self,
        records: I,
        sink: Arc<S>,
        publisher: &P,
        shutdown: CancellationToken,
    ) -> Result<WriterStats>
    where
        S: IndexSink + 'static,
        P: DocumentPublisher,
        I: IntoIterator<Item = RawRecord>,
    {
        let (tx, rx) = BatchedIndexWriter::<S>::channel(self.config.queue_capacity);
        let writer = BatchedIndexWriter::new(rx, sink, WriterConfig::from(&self.config));
        let handle = writer.spawn(shutdown.clone());

        for raw in records {
            if shutdown.is_cancelled() {
                info!("shutdown requested, stopping record feed");
                break;
            }
            let document = self.transformer.transform(raw);
            publisher
                .publish(Uuid::new_v4(), &document)
                .await
                .context("Failed to publish document")?;
            tx.send(document)
                .await
                .context("Index writer queue closed")?;
        }

        // Closing the queue lets the writer finish everything buffered.
        drop(tx);
        let stats = handle.await.context("Index writer task panicked")?;

        info!(
            documents = stats.documents,
            flushes = stats.flushes,
            "pipeline run complete"
        );
        Ok(stats)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
