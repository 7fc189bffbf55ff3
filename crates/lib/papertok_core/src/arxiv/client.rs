//! HTTP client for the arXiv query API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{ArxivError, PaperSource, atom};
use crate::models::paper::{FetchRequest, Paper};

/// Default arXiv query endpoint.
pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/api/query";

/// Default bound on a single upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query used when no category is requested.
const ALL_CATEGORIES_QUERY: &str = "cat:cs.* OR cat:stat.* OR cat:math.*";

/// Connection settings for [`ArxivClient`].
#[derive(Debug, Clone)]
pub struct ArxivConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// [`PaperSource`] backed by the public arXiv API.
#[derive(Debug, Clone)]
pub struct ArxivClient {
    base_url: String,
    http: reqwest::Client,
}

impl ArxivClient {
    pub fn new(config: ArxivConfig) -> Result<Self, ArxivError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ArxivError::FetchFailed(format!("http client: {e}")))?;
        Ok(Self {
            base_url: config.base_url,
            http,
        })
    }

    /// Issue one query and decode the feed.
    ///
    /// `on_error` picks the variant used for transport and status failures.
    async fn query(
        &self,
        params: &[(&str, String)],
        on_error: fn(String) -> ArxivError,
    ) -> Result<Vec<Paper>, ArxivError> {
        debug!(base_url = %self.base_url, ?params, "arxiv query");
        let resp = self
            .http
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "arxiv request failed");
                on_error(e.to_string())
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(%status, "arxiv returned non-200");
            return Err(on_error(format!("status {}", status.as_u16())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ArxivError::InvalidResponse(format!("failed to read response: {e}")))?;
        atom::parse_feed(&body)
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    async fn fetch_by_category(&self, req: &FetchRequest) -> Result<Vec<Paper>, ArxivError> {
        let search_query = if req.category.is_empty() {
            ALL_CATEGORIES_QUERY.to_string()
        } else {
            format!("cat:{}", req.category)
        };
        let mut params = vec![
            ("search_query", search_query),
            ("sortBy", req.sort_by.clone()),
            ("sortOrder", "descending".to_string()),
            ("max_results", req.limit.to_string()),
        ];
        if req.offset > 0 {
            params.push(("start", req.offset.to_string()));
        }
        self.query(&params, ArxivError::FetchFailed).await
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Paper>, ArxivError> {
        let params = [
            ("search_query", format!("all:{query}")),
            ("sortBy", "submittedDate".to_string()),
            ("sortOrder", "descending".to_string()),
            ("max_results", limit.to_string()),
        ];
        self.query(&params, ArxivError::SearchFailed).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Paper>, ArxivError> {
        let papers = self.search(&format!("id:{id}"), 1).await?;
        Ok(papers.into_iter().next())
    }
}
