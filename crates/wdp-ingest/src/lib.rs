//! WDP Ingest Library
//!
//! Ingestion pipeline for Wikipedia XML dump snapshots: resolves the
//! published MD5 manifest into download descriptors, transforms raw dump
//! records into structured documents, and batches them into a search
//! index through a bounded queue.
//!
//! # Pipeline Stages
//!
//! - **Manifest**: parse the dump manifest and select the preferred
//!   file variant ([`manifest`], [`source`])
//! - **Transform**: raw record to structured document with link
//!   extraction and title classification ([`transform`], [`links`])
//! - **Index**: batched writes with high-water-mark and idle-timeout
//!   flushing ([`indexer`], [`sink`])
//!
//! # Example
//!
//! ```no_run
//! use wdp_ingest::config::PipelineConfig;
//! use wdp_ingest::pipeline::DumpPipeline;
//! use wdp_ingest::transform::PassthroughCleaner;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = DumpPipeline::new(PipelineConfig::default(), PassthroughCleaner)?;
//!     let descriptors = pipeline.resolve_descriptors(None).await?;
//!     for descriptor in descriptors {
//!         println!("{}", descriptor.resolved_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod indexer;
pub mod links;
pub mod manifest;
pub mod pipeline;
pub mod publish;
pub mod sink;
pub mod source;
pub mod transform;
