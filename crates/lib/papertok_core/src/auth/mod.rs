//! Authentication primitives.
//!
//! Provides password hashing and signed session tokens, shared by the
//! `userauth` flows and the HTTP middleware in `papertok_api`.

pub mod jwt;
pub mod password;

use chrono::{Duration, Utc};
use thiserror::Error;

pub use jwt::TokenService;
pub use password::PasswordHasher;

/// Secrets that ship in sample configs and must never sign real tokens.
pub const INSECURE_SECRETS: &[&str] = &[
    "change-this-secret-in-production",
    "your-secret-key-change-in-production",
    "your-secret-key",
    "secret",
];

/// Minimum bcrypt cost accepted by the hasher.
pub const MIN_PASSWORD_COST: u32 = 4;

/// Maximum bcrypt cost accepted by the hasher.
pub const MAX_PASSWORD_COST: u32 = 31;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid token claims")]
    InvalidClaims,

    #[error("failed to generate token: {0}")]
    TokenGenerationFailed(String),

    #[error("failed to hash password: {0}")]
    HashingFailed(String),

    #[error("invalid auth config: {0}")]
    InvalidConfig(String),
}

/// Token and hashing policy. Validated once by [`TokenService::new`].
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Lifetime of an access token.
    pub access_token_expiry: Duration,
    /// Lifetime advertised for refresh flows.
    pub refresh_token_expiry: Duration,
    /// `iss` claim written into every token.
    pub issuer: String,
    /// bcrypt cost factor.
    pub password_cost: u32,
}

impl TokenConfig {
    /// Config with production defaults (24h access, 7d refresh, cost 10).
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry: Duration::hours(24),
            refresh_token_expiry: Duration::days(7),
            issuer: "papertok".to_string(),
            password_cost: 10,
        }
    }

    pub fn with_access_token_expiry(mut self, expiry: Duration) -> Self {
        self.access_token_expiry = expiry;
        self
    }

    pub fn with_refresh_token_expiry(mut self, expiry: Duration) -> Self {
        self.refresh_token_expiry = expiry;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Check every invariant the token service relies on.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidConfig("signing secret is empty".into()));
        }
        if INSECURE_SECRETS.contains(&self.secret.as_str()) {
            return Err(AuthError::InvalidConfig(
                "signing secret is a known placeholder value".into(),
            ));
        }
        if self.access_token_expiry <= Duration::zero() {
            return Err(AuthError::InvalidConfig(
                "access token expiry must be positive".into(),
            ));
        }
        let now = Utc::now();
        if now.checked_add_signed(self.access_token_expiry).is_none() {
            return Err(AuthError::InvalidConfig(
                "access token expiry is out of range".into(),
            ));
        }
        if now.checked_add_signed(self.refresh_token_expiry).is_none() {
            return Err(AuthError::InvalidConfig(
                "refresh token expiry is out of range".into(),
            ));
        }
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&self.password_cost) {
            return Err(AuthError::InvalidConfig(format!(
                "password cost {} outside {MIN_PASSWORD_COST}..={MAX_PASSWORD_COST}",
                self.password_cost
            )));
        }
        Ok(())
    }
}
