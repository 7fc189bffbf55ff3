//! Shared fixtures for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use papertok_api::config::ApiConfig;
use papertok_api::{AppState, router};
use papertok_core::arxiv::{ArxivError, PaperSource};
use papertok_core::cache::TtlCache;
use papertok_core::models::paper::{FetchRequest, Paper};
use papertok_core::papers::PaperEntry;
use papertok_core::users::MemoryUserStore;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub fn paper(id: &str) -> Paper {
    Paper {
        id: id.to_string(),
        title: format!("Paper {id}"),
        authors: vec!["Ada Lovelace".to_string()],
        summary: "Summary.".to_string(),
        published: None,
        updated: None,
        categories: vec!["cs.AI".to_string()],
        primary_category: "cs.AI".to_string(),
        arxiv_url: format!("http://arxiv.org/abs/{id}"),
        pdf_url: format!("http://arxiv.org/pdf/{id}"),
        image_url: format!("https://arxiv.org/html/{id}/x1.png"),
    }
}

/// Scripted upstream that counts calls.
#[derive(Default)]
pub struct FakeSource {
    pub papers: Vec<Paper>,
    pub fail: bool,
    pub fetches: AtomicUsize,
    pub searches: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl FakeSource {
    pub fn with_papers(ids: &[&str]) -> Self {
        Self {
            papers: ids.iter().map(|id| paper(id)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaperSource for FakeSource {
    async fn fetch_by_category(&self, req: &FetchRequest) -> Result<Vec<Paper>, ArxivError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ArxivError::FetchFailed("status 503".into()));
        }
        Ok(self
            .papers
            .iter()
            .take(req.limit as usize)
            .cloned()
            .collect())
    }

    async fn search(&self, _query: &str, limit: u32) -> Result<Vec<Paper>, ArxivError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ArxivError::SearchFailed("status 503".into()));
        }
        Ok(self.papers.iter().take(limit as usize).cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Paper>, ArxivError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ArxivError::SearchFailed("status 503".into()));
        }
        Ok(self.papers.iter().find(|p| p.id == id).cloned())
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub source: Arc<FakeSource>,
}

pub fn test_config() -> ApiConfig {
    let mut config = ApiConfig::new(SECRET);
    config.rate_limit.enabled = false;
    config
}

pub fn app_with(config: ApiConfig, source: FakeSource) -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let source = Arc::new(source);
    let cache = Arc::new(TtlCache::<PaperEntry>::new());
    let state = AppState::new(config, users.clone(), source.clone(), cache).expect("state");
    TestApp {
        router: router(state),
        users,
        source,
    }
}

pub fn app(source: FakeSource) -> TestApp {
    app_with(test_config(), source)
}

impl TestApp {
    /// Send a request and decode the JSON envelope.
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = serde_json::from_slice(&body).expect("parse JSON");
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_authed(&self, uri: &str, authorization: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, authorization)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub fn error_code(json: &Value) -> &str {
    json["error"]["code"].as_str().unwrap_or_default()
}
