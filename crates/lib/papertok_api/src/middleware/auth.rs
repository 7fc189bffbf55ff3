//! Authentication middleware: Bearer token extraction and JWT verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use papertok_core::auth::AuthError;
use papertok_core::models::auth::Claims;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Key used to store verified `Claims` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the JWT,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Unauthorized {
            code: "MISSING_TOKEN",
            message: "Authorization header is required",
        })?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized {
            code: "INVALID_TOKEN_FORMAT",
            message: "Authorization header must be in format: Bearer <token>",
        })?;

    let claims = state
        .auth
        .tokens()
        .validate_token(token)
        .map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            match e {
                AuthError::ExpiredToken => AppError::Unauthorized {
                    code: "TOKEN_EXPIRED",
                    message: "Token has expired",
                },
                _ => AppError::Unauthorized {
                    code: "INVALID_TOKEN",
                    message: "Invalid or expired token",
                },
            }
        })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
