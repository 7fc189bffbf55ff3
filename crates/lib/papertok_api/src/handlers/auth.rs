//! Account request handlers.

use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use papertok_core::models::auth::{AuthSession, Profile};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, LoginRequest, RefreshRequest, RegisterRequest};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// `POST /api/v1/auth/register`
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<ApiResponse<AuthSession>> {
    let req = body(payload)?;
    let session = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;
    Ok(ApiResponse::ok(session))
}

/// `POST /api/v1/auth/login`: identifier is an email or a username.
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<ApiResponse<AuthSession>> {
    let req = body(payload)?;
    let session = state.auth.login(&req.identifier, &req.password).await?;
    Ok(ApiResponse::ok(session))
}

/// `POST /api/v1/auth/refresh`
pub async fn refresh_handler(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<ApiResponse<AuthSession>> {
    let req = body(payload)?;
    if req.token.is_empty() {
        return Err(AppError::BadRequest("token is required".into()));
    }
    let session = state.auth.refresh_token(&req.token).await?;
    Ok(ApiResponse::ok(session))
}

/// `GET /api/v1/auth/profile`. Requires authentication.
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state.auth.get_profile(claims.user_id).await?;
    Ok(ApiResponse::ok(profile))
}
