use std::sync::Arc;

use tracing::warn;

use super::{PaperCache, Result};
use crate::arxiv::PaperSource;
use crate::models::paper::{FetchRequest, Paper};

/// Category feed, cache-first.
///
/// The cache is keyed by category alone: a warm entry is returned as-is
/// whatever `limit`, `offset` or `sort_by` the caller asks for.
#[derive(Clone)]
pub struct PaperFeedService {
    source: Arc<dyn PaperSource>,
    cache: PaperCache,
}

impl PaperFeedService {
    pub fn new(source: Arc<dyn PaperSource>, cache: PaperCache) -> Self {
        Self { source, cache }
    }

    pub async fn get_feed(
        &self,
        category: &str,
        limit: u32,
        offset: u32,
        sort_by: &str,
    ) -> Result<Vec<Paper>> {
        if let Some(papers) = self.cache.get_feed(category) {
            return Ok(papers);
        }

        let req = FetchRequest {
            category: category.to_string(),
            limit,
            offset,
            sort_by: sort_by.to_string(),
        };
        let papers = self.source.fetch_by_category(&req).await.map_err(|e| {
            warn!(category, error = %e, "feed fetch failed");
            e
        })?;
        self.cache.set_feed(category, papers.clone());
        Ok(papers)
    }
}
