use thiserror::Error;

use crate::auth::AuthError;
use crate::users::UserStoreError;

/// Which input check rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid username format")]
    InvalidUsername,

    #[error("invalid email format")]
    InvalidEmail,

    #[error("password is too weak")]
    WeakPassword,

    #[error("identifier and password are required")]
    MissingCredentials,
}

/// Account flow errors.
#[derive(Debug, Error)]
pub enum UserAuthError {
    #[error("user already exists")]
    UserAlreadyExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("user store: {0}")]
    Store(#[from] UserStoreError),
}

impl UserAuthError {
    /// Stable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserAlreadyExists => "USER_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Auth(AuthError::ExpiredToken) => "TOKEN_EXPIRED",
            Self::Auth(AuthError::InvalidToken(_) | AuthError::InvalidClaims) => "INVALID_TOKEN",
            Self::Auth(_) | Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for [`code`](Self::code).
    pub fn status(&self) -> u16 {
        match self.code() {
            "USER_EXISTS" => 409,
            "INVALID_CREDENTIALS" | "UNAUTHORIZED" | "TOKEN_EXPIRED" | "INVALID_TOKEN" => 401,
            "USER_NOT_FOUND" => 404,
            "VALIDATION_FAILED" => 400,
            _ => 500,
        }
    }

    /// User-facing message shown by the front end.
    pub fn message(&self) -> &'static str {
        match self {
            Self::UserAlreadyExists => "该邮箱或用户名已被注册",
            Self::InvalidCredentials => "邮箱或密码错误",
            Self::UserNotFound => "用户不存在",
            Self::ValidationFailed(reason) => match reason {
                ValidationError::InvalidUsername => {
                    "用户名需要3-50个字符，只能包含字母、数字和下划线"
                }
                ValidationError::InvalidEmail => "邮箱格式不正确",
                ValidationError::WeakPassword => {
                    "密码至少8个字符，需包含大写字母、小写字母、数字、特殊字符中的至少2种"
                }
                ValidationError::MissingCredentials => "输入信息验证失败",
            },
            Self::Unauthorized => "请先登录",
            Self::Auth(AuthError::ExpiredToken) => "登录已过期，请重新登录",
            Self::Auth(AuthError::InvalidToken(_) | AuthError::InvalidClaims) => "登录凭证无效",
            Self::Auth(_) | Self::Store(_) => "服务器错误，请稍后重试",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_status_table() {
        let cases = [
            (UserAuthError::UserAlreadyExists, "USER_EXISTS", 409),
            (UserAuthError::InvalidCredentials, "INVALID_CREDENTIALS", 401),
            (UserAuthError::UserNotFound, "USER_NOT_FOUND", 404),
            (
                UserAuthError::ValidationFailed(ValidationError::WeakPassword),
                "VALIDATION_FAILED",
                400,
            ),
            (UserAuthError::Unauthorized, "UNAUTHORIZED", 401),
            (UserAuthError::Auth(AuthError::ExpiredToken), "TOKEN_EXPIRED", 401),
            (UserAuthError::Auth(AuthError::InvalidClaims), "INVALID_TOKEN", 401),
            (
                UserAuthError::Auth(AuthError::HashingFailed("x".into())),
                "INTERNAL_ERROR",
                500,
            ),
            (
                UserAuthError::Store(UserStoreError::Database(sqlx::Error::PoolTimedOut)),
                "INTERNAL_ERROR",
                500,
            ),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.code(), code, "{err}");
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn internal_message_hides_detail() {
        let err = UserAuthError::Store(UserStoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.message(), "服务器错误，请稍后重试");
    }
}
