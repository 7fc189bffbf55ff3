use std::sync::Arc;

use tracing::warn;

use super::{PaperCache, PaperError, Result};
use crate::arxiv::PaperSource;
use crate::models::paper::Paper;

/// Keyword search and single-paper lookup.
#[derive(Clone)]
pub struct PaperSearchService {
    source: Arc<dyn PaperSource>,
    cache: PaperCache,
}

impl PaperSearchService {
    pub fn new(source: Arc<dyn PaperSource>, cache: PaperCache) -> Self {
        Self { source, cache }
    }

    /// Search is always forwarded upstream.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PaperError::InvalidParams("search query is required".into()));
        }
        self.source.search(query, limit).await.map_err(|e| {
            warn!(query, error = %e, "paper search failed");
            e.into()
        })
    }

    /// Cached lookup by arXiv id. Only found papers are cached.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Paper>> {
        if let Some(paper) = self.cache.get_paper(id) {
            return Ok(Some(paper));
        }
        let found = self.source.get_by_id(id).await.map_err(|e| {
            warn!(id, error = %e, "paper lookup failed");
            PaperError::from(e)
        })?;
        if let Some(paper) = &found {
            self.cache.set_paper(paper.clone());
        }
        Ok(found)
    }
}
