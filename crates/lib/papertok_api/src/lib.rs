//! # papertok_api
//!
//! HTTP API library for PaperTok.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use papertok_core::arxiv::PaperSource;
use papertok_core::auth::TokenService;
use papertok_core::cache::Cache;
use papertok_core::papers::{PaperCache, PaperEntry, PaperFeedService, PaperSearchService};
use papertok_core::userauth::UserAuthService;
use papertok_core::users::UserStore;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{ApiConfig, ConfigError};
use crate::handlers::{auth, health, papers};
use crate::middleware::rate_limit::ClientRateLimiter;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    pub auth: UserAuthService,
    pub feed: PaperFeedService,
    pub search: PaperSearchService,
    pub rate_limiter: Arc<ClientRateLimiter>,
}

impl AppState {
    /// Wire the services over the given collaborators.
    ///
    /// Fails if the token settings in `config` are unusable.
    pub fn new(
        config: ApiConfig,
        users: Arc<dyn UserStore>,
        source: Arc<dyn PaperSource>,
        cache: Arc<dyn Cache<PaperEntry>>,
    ) -> Result<Self, ConfigError> {
        let tokens = Arc::new(TokenService::new(config.token_config()?)?);
        let paper_cache = PaperCache::new(cache, config.cache_ttl()?);
        let rate_limiter = Arc::new(ClientRateLimiter::from_config(&config.rate_limit));
        Ok(Self {
            auth: UserAuthService::new(tokens, users),
            feed: PaperFeedService::new(Arc::clone(&source), paper_cache.clone()),
            search: PaperSearchService::new(source, paper_cache),
            rate_limiter,
            config: Arc::new(config),
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `papertok_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    papertok_core::migrate::migrate(pool).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_REFRESH, post(auth::refresh_handler))
        .route(routes::GET_PAPERS, get(papers::list_handler))
        .route(routes::GET_PAPERS_SEARCH, get(papers::search_handler))
        .route(routes::GET_PAPERS_ID, get(papers::get_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_PROFILE, get(auth::profile_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let mut api = Router::new().merge(public).merge(protected);
    if state.config.rate_limit.enabled {
        api = api.layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_requests,
        ));
    }

    Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
