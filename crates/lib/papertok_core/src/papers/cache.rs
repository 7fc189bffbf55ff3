use std::sync::Arc;

use tracing::debug;

use crate::cache::Cache;
use crate::models::paper::Paper;

/// Value stored in the paper cache.
#[derive(Debug, Clone)]
pub enum PaperEntry {
    Feed(Vec<Paper>),
    Paper(Paper),
}

pub fn category_key(category: &str) -> String {
    format!("papers:category:{category}")
}

pub fn paper_key(id: &str) -> String {
    format!("papers:id:{id}")
}

/// Typed view over a shared [`Cache`] with a fixed entry TTL.
#[derive(Clone)]
pub struct PaperCache {
    cache: Arc<dyn Cache<PaperEntry>>,
    ttl: chrono::Duration,
}

impl PaperCache {
    pub fn new(cache: Arc<dyn Cache<PaperEntry>>, ttl: chrono::Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    pub fn get_feed(&self, category: &str) -> Option<Vec<Paper>> {
        match self.cache.get(&category_key(category)) {
            Some(PaperEntry::Feed(papers)) => {
                debug!(category, "feed cache hit");
                Some(papers)
            }
            _ => {
                debug!(category, "feed cache miss");
                None
            }
        }
    }

    pub fn set_feed(&self, category: &str, papers: Vec<Paper>) {
        self.cache
            .set(&category_key(category), PaperEntry::Feed(papers), self.ttl);
    }

    pub fn get_paper(&self, id: &str) -> Option<Paper> {
        match self.cache.get(&paper_key(id)) {
            Some(PaperEntry::Paper(paper)) => {
                debug!(id, "paper cache hit");
                Some(paper)
            }
            _ => {
                debug!(id, "paper cache miss");
                None
            }
        }
    }

    pub fn set_paper(&self, paper: Paper) {
        let key = paper_key(&paper.id);
        self.cache.set(&key, PaperEntry::Paper(paper), self.ttl);
    }

    pub fn invalidate_feed(&self, category: &str) {
        self.cache.delete(&category_key(category));
    }
}

impl std::fmt::Debug for PaperCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperCache").field("ttl", &self.ttl).finish()
    }
}
