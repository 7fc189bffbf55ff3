//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use papertok_core::arxiv::ArxivError;
use papertok_core::papers::PaperError;
use papertok_core::userauth::UserAuthError;
use thiserror::Error;
use tracing::error;

use crate::models::{ApiResponse, ErrorInfo};

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body could not be decoded.
    #[error("invalid request format: {0}")]
    BadRequest(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Unauthorized {
        code: &'static str,
        message: &'static str,
    },

    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Account(#[from] UserAuthError),

    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        source: ArxivError,
    },
}

impl AppError {
    /// Map a paper service failure, labelling upstream errors with `message`.
    pub fn from_paper(err: PaperError, message: &'static str) -> Self {
        match err {
            PaperError::InvalidParams(m) => AppError::InvalidParams(m),
            PaperError::Upstream(source) => AppError::Upstream { message, source },
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            AppError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid request format".into(),
                Some(detail.clone()),
            ),
            AppError::InvalidParams(m) => {
                (StatusCode::BAD_REQUEST, "INVALID_PARAMS", m.clone(), None)
            }
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "NOT_FOUND", m.clone(), None),
            AppError::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, *code, message.to_string(), None)
            }
            AppError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED",
                "请求过于频繁，请稍后再试".into(),
                Some(format!("retry after {retry_after_secs}s")),
            ),
            AppError::Account(e) => (
                StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.code(),
                e.message().to_string(),
                None,
            ),
            AppError::Upstream { message, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                message.to_string(),
                Some(source.to_string()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();
        if status.is_server_error() {
            error!(%status, code, error = %self, "request failed");
        }
        let mut response = ApiResponse::error(ErrorInfo {
            code: code.to_string(),
            message,
            details,
        })
        .into_response();
        *response.status_mut() = status;
        if let AppError::RateLimited { retry_after_secs } = self {
            response.headers_mut().insert(
                axum::http::header::RETRY_AFTER,
                axum::http::HeaderValue::from(retry_after_secs),
            );
        }
        response
    }
}
