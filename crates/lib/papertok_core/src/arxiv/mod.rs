//! Upstream paper source.
//!
//! [`PaperSource`] is the contract the feed and search services consume;
//! [`ArxivClient`] implements it against the public arXiv query API.

pub mod atom;
pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::paper::{FetchRequest, Paper};

pub use client::{ArxivClient, ArxivConfig};

/// Upstream failures. Callers treat every variant as opaque and
/// non-retryable.
#[derive(Debug, Clone, Error)]
pub enum ArxivError {
    #[error("failed to fetch papers from arXiv: {0}")]
    FetchFailed(String),

    #[error("failed to search papers: {0}")]
    SearchFailed(String),

    #[error("invalid response from arXiv API: {0}")]
    InvalidResponse(String),
}

/// Read-only access to an upstream paper catalogue.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// One page of a category feed, newest first by `sort_by`.
    async fn fetch_by_category(&self, req: &FetchRequest) -> Result<Vec<Paper>, ArxivError>;

    /// Keyword search across all fields.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, ArxivError>;

    /// A single paper by arXiv id; `Ok(None)` when upstream has no match.
    async fn get_by_id(&self, id: &str) -> Result<Option<Paper>, ArxivError>;
}
