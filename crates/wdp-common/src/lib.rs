//! WDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the WDP project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all WDP workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Checksums**: Dump artifact integrity verification utilities
//! - **Logging**: Centralized tracing initialization
//! - **Types**: Shared domain types and data structures
//!
//! # Example
//!
//! ```no_run
//! use wdp_common::{Result, WdpError};
//! use wdp_common::checksum::compute_file_checksum;
//! use wdp_common::types::ChecksumAlgorithm;
//!
//! fn verify_artifact(path: &str) -> Result<()> {
//!     let checksum = compute_file_checksum(path, ChecksumAlgorithm::Md5)?;
//!     tracing::info!(%checksum, "artifact checksum computed");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, WdpError};
