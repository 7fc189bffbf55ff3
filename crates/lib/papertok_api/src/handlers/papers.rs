//! Paper feed, search and lookup handlers.

use axum::extract::{Path, Query, State};
use papertok_core::models::paper::Paper;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ApiResponse, PapersQuery, PapersResponse, SearchQuery};

pub const DEFAULT_CATEGORY: &str = "cs.AI";
pub const DEFAULT_SORT_BY: &str = "lastUpdatedDate";
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Out-of-range or unparseable limits fall back to the default.
fn parse_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| (1..=MAX_LIMIT).contains(n))
        .unwrap_or(DEFAULT_LIMIT)
}

fn parse_offset(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(0)
}

fn non_empty(raw: Option<String>, default: &str) -> String {
    raw.filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// `GET /api/v1/papers`
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<PapersQuery>,
) -> AppResult<ApiResponse<PapersResponse>> {
    let category = non_empty(params.category, DEFAULT_CATEGORY);
    let sort_by = non_empty(params.sort_by, DEFAULT_SORT_BY);
    let limit = parse_limit(params.limit.as_deref());
    let offset = parse_offset(params.offset.as_deref());

    let papers = state
        .feed
        .get_feed(&category, limit, offset, &sort_by)
        .await
        .map_err(|e| AppError::from_paper(e, "Failed to fetch papers from arXiv"))?;

    Ok(ApiResponse::ok(PapersResponse {
        total: papers.len(),
        page: offset / limit + 1,
        page_size: limit,
        papers,
    }))
}

/// `GET /api/v1/papers/search`
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<ApiResponse<PapersResponse>> {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::InvalidParams(
            "Query parameter 'query' is required".into(),
        ));
    }
    let limit = parse_limit(params.limit.as_deref());

    let papers = state
        .search
        .search(&query, limit)
        .await
        .map_err(|e| AppError::from_paper(e, "Failed to search papers"))?;

    Ok(ApiResponse::ok(PapersResponse {
        total: papers.len(),
        page: 1,
        page_size: limit,
        papers,
    }))
}

/// `GET /api/v1/papers/{id}`
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Paper>> {
    if id.trim().is_empty() {
        return Err(AppError::InvalidParams("Paper ID is required".into()));
    }
    state
        .search
        .get_by_id(&id)
        .await
        .map_err(|e| AppError::from_paper(e, "Failed to fetch paper"))?
        .map(ApiResponse::ok)
        .ok_or_else(|| AppError::NotFound("Paper not found".into()))
}
