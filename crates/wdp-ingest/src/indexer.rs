//! Asynchronous batched index writer
//!
//! One bounded document queue is shared between any number of producers
//! and exactly one consumer task. Producers block (backpressure) when
//! the queue is full. The consumer batches documents and flushes on two
//! triggers: batch size reaching the high-water mark, and a poll
//! timeout elapsing with a non-empty batch (bounds staleness under low
//! throughput).
//!
//! Shutdown is cooperative: the cancellation token is observed once per
//! iteration, never preemptively, so an in-flight flush always
//! completes. On shutdown the writer drains whatever is still buffered
//! in the queue without further waiting and flushes it, retrying a
//! failed flush up to the attempt limit before dropping the batch with
//! its count recorded, so no buffered document is ever lost silently.
//!
//! Ordering: FIFO within one flushed batch. Across batches, a document
//! enqueued while a high-water-mark flush is racing may land in either
//! batch; that weak ordering is accepted.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::document::WikiDocument;
use crate::sink::IndexSink;

/// Configuration slice the writer needs
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Batch size that forces an immediate flush
    pub high_water_mark: usize,
    /// How long the consumer waits for the next document before an
    /// idle-triggered flush
    pub poll_timeout: Duration,
    /// Consecutive flush failures tolerated before the batch is dropped
    pub max_flush_attempts: u32,
}

impl From<&PipelineConfig> for WriterConfig {
    fn from(config: &PipelineConfig) -> Self {
        WriterConfig {
            high_water_mark: config.high_water_mark,
            poll_timeout: config.poll_timeout(),
            max_flush_attempts: config.max_flush_attempts,
        }
    }
}

/// Counters reported when the writer stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub documents: u64,
    pub flushes: u64,
    pub failed_flushes: u64,
    pub dropped: u64,
}

/// Consumes documents from the bounded queue, batches them, and commits
/// batches to the index sink
pub struct BatchedIndexWriter<S: IndexSink> {
    receiver: mpsc::Receiver<WikiDocument>,
    sink: Arc<S>,
    config: WriterConfig,
    batch: Vec<WikiDocument>,
    consecutive_failures: u32,
    stats: WriterStats,
}

impl<S: IndexSink + 'static> BatchedIndexWriter<S> {
    /// Create the bounded document queue shared by producers and writer
    pub fn channel(capacity: usize) -> (mpsc::Sender<WikiDocument>, mpsc::Receiver<WikiDocument>) {
        mpsc::channel(capacity)
    }

    pub fn new(receiver: mpsc::Receiver<WikiDocument>, sink: Arc<S>, config: WriterConfig) -> Self {
        Self {
            receiver,
            sink,
            config,
            batch: Vec::new(),
            consecutive_failures: 0,
            stats: WriterStats::default(),
        }
    }

    /// Spawn the consumption loop on its own task
    ///
    /// The task runs until the token is cancelled or every sender is
    /// dropped, then drains and reports its stats through the handle.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<WriterStats> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(mut self, shutdown: CancellationToken) -> WriterStats {
        info!(
            high_water_mark = self.config.high_water_mark,
            poll_timeout_secs = self.config.poll_timeout.as_secs(),
            "index writer running"
        );

        loop {
            // Cooperative stop: checked once per iteration, never mid-flush.
            if shutdown.is_cancelled() {
                break;
            }

            match timeout(self.config.poll_timeout, self.receiver.recv()).await {
                Ok(Some(document)) => {
                    self.batch.push(document);
                    self.stats.documents += 1;
                    if self.batch.len() >= self.config.high_water_mark {
                        self.flush().await;
                    }
                },
                Ok(None) => {
                    debug!("all producers finished");
                    break;
                },
                Err(_elapsed) => {
                    if !self.batch.is_empty() {
                        debug!(buffered = self.batch.len(), "idle poll timeout, flushing");
                        self.flush().await;
                    }
                },
            }
        }

        self.drain().await;

        info!(
            documents = self.stats.documents,
            flushes = self.stats.flushes,
            failed_flushes = self.stats.failed_flushes,
            dropped = self.stats.dropped,
            "index writer stopped"
        );
        self.stats
    }

    /// Drain everything still buffered in the queue, then flush
    ///
    /// Non-blocking: only documents already enqueued are taken, new
    /// arrivals are not waited for. This is the last flush trigger
    /// before stopping, so a failed flush is retried here until the
    /// batch is written or dropped; nothing stays retained past
    /// shutdown uncounted.
    async fn drain(&mut self) {
        info!("index writer draining");
        while let Ok(document) = self.receiver.try_recv() {
            self.batch.push(document);
            self.stats.documents += 1;
        }
        // Terminates: flush clears the batch on success, and after
        // max_flush_attempts consecutive failures it drops the batch.
        while !self.batch.is_empty() {
            self.flush().await;
        }
    }

    /// Bulk-write and commit the current batch
    ///
    /// On success the batch is cleared. On failure the batch is
    /// retained and retried at the next flush trigger; after
    /// `max_flush_attempts` consecutive failures it is dropped loudly.
    async fn flush(&mut self) {
        if self.batch.is_empty() {
            debug!("no documents to flush");
            return;
        }

        let size = self.batch.len();
        let result = match self.sink.bulk_write(&self.batch).await {
            Ok(()) => self.sink.commit().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.batch.clear();
                self.consecutive_failures = 0;
                self.stats.flushes += 1;
                debug!(documents = size, "flushed batch");
            },
            Err(e) => {
                self.consecutive_failures += 1;
                self.stats.failed_flushes += 1;
                if self.consecutive_failures >= self.config.max_flush_attempts {
                    error!(
                        documents = size,
                        attempts = self.consecutive_failures,
                        error = %e,
                        "dropping batch after repeated flush failures"
                    );
                    self.stats.dropped += size as u64;
                    self.batch.clear();
                    self.consecutive_failures = 0;
                } else {
                    warn!(
                        documents = size,
                        attempt = self.consecutive_failures,
                        error = %e,
                        "flush failed, batch retained for retry"
                    );
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{SiteInfo, WikiCategory};
    use crate::sink::SinkError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn doc(id: &str) -> WikiDocument {
        WikiDocument {
            id: id.into(),
            namespace: "Main".into(),
            namespace_code: 0,
            revision_id: "1".into(),
            site_info: SiteInfo::default(),
            wiki_text: None,
            cleaned_text: None,
            links: vec![],
            source_timestamp: None,
            dump_timestamp: String::new(),
            title: format!("Title {}", id),
            category: WikiCategory::Article,
            processed_at: Utc::now(),
        }
    }

    /// Records every bulk write; can be told to fail the first N writes
    #[derive(Default)]
    struct RecordingSink {
        writes: Mutex<Vec<Vec<String>>>,
        commits: AtomicUsize,
        failures_remaining: AtomicUsize,
    }

    impl RecordingSink {
        fn failing(times: usize) -> Self {
            Self {
                failures_remaining: AtomicUsize::new(times),
                ..Default::default()
            }
        }

        fn writes(&self) -> Vec<Vec<String>> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IndexSink for RecordingSink {
        async fn bulk_write(&self, batch: &[WikiDocument]) -> Result<(), SinkError> {
            if self
                .failures_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(SinkError::Status {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            self.writes
                .lock()
                .unwrap()
                .push(batch.iter().map(|d| d.id.clone()).collect());
            Ok(())
        }

        async fn commit(&self) -> Result<(), SinkError> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn writer_config(high_water_mark: usize, poll_secs: u64) -> WriterConfig {
        WriterConfig {
            high_water_mark,
            poll_timeout: Duration::from_secs(poll_secs),
            max_flush_attempts: 3,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_high_water_mark_triggers_single_flush() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let writer = BatchedIndexWriter::new(rx, sink.clone(), writer_config(5, 60));
        let handle = writer.spawn(CancellationToken::new());

        for i in 0..5 {
            tx.send(doc(&i.to_string())).await.unwrap();
        }
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.documents, 5);
        assert_eq!(stats.flushes, 1);
        assert_eq!(sink.writes(), vec![vec!["0", "1", "2", "3", "4"]]);
        assert_eq!(sink.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_flushes_single_document() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let writer = BatchedIndexWriter::new(rx, sink.clone(), writer_config(100, 5));
        let handle = writer.spawn(CancellationToken::new());

        tx.send(doc("lonely")).await.unwrap();

        // Wait past the poll timeout with no further arrivals.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(sink.writes(), vec![vec!["lonely"]]);

        drop(tx);
        let stats = handle.await.unwrap();
        assert_eq!(stats.flushes, 1);
        assert_eq!(sink.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_drains_buffered_documents_exactly_once() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let writer = BatchedIndexWriter::new(rx, sink.clone(), writer_config(100, 60));

        // Buffer k documents, then signal stop before the writer starts.
        for i in 0..3 {
            tx.send(doc(&i.to_string())).await.unwrap();
        }
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let handle = writer.spawn(shutdown);

        let stats = handle.await.unwrap();
        assert_eq!(stats.documents, 3);
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.dropped, 0);
        // All k documents in one drain flush, no duplicates, no omissions.
        assert_eq!(sink.writes(), vec![vec!["0", "1", "2"]]);
        assert_eq!(sink.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_order_matches_arrival_order() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let writer = BatchedIndexWriter::new(rx, sink.clone(), writer_config(4, 60));
        let handle = writer.spawn(CancellationToken::new());

        for id in ["a", "b", "c", "d"] {
            tx.send(doc(id)).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(sink.writes(), vec![vec!["a", "b", "c", "d"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_flush_retains_batch_until_success() {
        let sink = Arc::new(RecordingSink::failing(1));
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let writer = BatchedIndexWriter::new(rx, sink.clone(), writer_config(2, 60));
        let handle = writer.spawn(CancellationToken::new());

        // First flush attempt fails; the two documents stay batched.
        tx.send(doc("a")).await.unwrap();
        tx.send(doc("b")).await.unwrap();
        // Third document re-triggers the high-water mark with the
        // retained batch included.
        tx.send(doc("c")).await.unwrap();
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.failed_flushes, 1);
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.dropped, 0);
        assert_eq!(sink.writes(), vec![vec!["a", "b", "c"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_dropped_after_max_flush_attempts() {
        let sink = Arc::new(RecordingSink::failing(10));
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let config = WriterConfig {
            high_water_mark: 2,
            poll_timeout: Duration::from_secs(60),
            max_flush_attempts: 2,
        };
        let writer = BatchedIndexWriter::new(rx, sink.clone(), config);
        let handle = writer.spawn(CancellationToken::new());

        tx.send(doc("a")).await.unwrap();
        tx.send(doc("b")).await.unwrap();
        tx.send(doc("c")).await.unwrap();
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.flushes, 0);
        assert_eq!(stats.failed_flushes, 2);
        assert_eq!(stats.dropped, 3);
        assert!(sink.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_retries_failed_final_flush() {
        let sink = Arc::new(RecordingSink::failing(1));
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let writer = BatchedIndexWriter::new(rx, sink.clone(), writer_config(100, 60));

        // Buffer below the high-water mark, then stop before the writer
        // starts; the drain flush is the only remaining trigger.
        tx.send(doc("a")).await.unwrap();
        tx.send(doc("b")).await.unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let handle = writer.spawn(shutdown);

        let stats = handle.await.unwrap();
        assert_eq!(stats.failed_flushes, 1);
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.dropped, 0);
        assert_eq!(sink.writes(), vec![vec!["a", "b"]]);
        assert_eq!(sink.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_drops_batch_loudly_when_sink_stays_down() {
        let sink = Arc::new(RecordingSink::failing(10));
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(16);
        let config = WriterConfig {
            high_water_mark: 100,
            poll_timeout: Duration::from_secs(60),
            max_flush_attempts: 2,
        };
        let writer = BatchedIndexWriter::new(rx, sink.clone(), config);

        tx.send(doc("a")).await.unwrap();
        tx.send(doc("b")).await.unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let handle = writer.spawn(shutdown);

        let stats = handle.await.unwrap();
        // Every undeliverable document is accounted for, none retained
        // past shutdown.
        assert_eq!(stats.failed_flushes, 2);
        assert_eq!(stats.flushes, 0);
        assert_eq!(stats.dropped, 2);
        assert!(sink.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_queue_stop_performs_no_flush() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = BatchedIndexWriter::<RecordingSink>::channel(4);
        let writer = BatchedIndexWriter::new(rx, sink.clone(), writer_config(100, 5));
        let shutdown = CancellationToken::new();
        let handle = writer.spawn(shutdown.clone());

        shutdown.cancel();
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.flushes, 0);
        assert!(sink.writes().is_empty());
        assert_eq!(sink.commits.load(Ordering::SeqCst), 0);
    }
}
