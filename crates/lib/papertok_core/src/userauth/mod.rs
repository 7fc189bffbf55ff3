//! Account flows: register, login, profile and session refresh.
//!
//! [`UserAuthService`] composes the [`TokenService`] with a [`UserStore`] and
//! translates their failures into [`UserAuthError`], whose `code()` is what
//! clients see.

mod error;
pub mod validation;

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::TokenService;
use crate::models::auth::{AuthSession, Claims, NewUser, Profile, User, UserRecord};
use crate::users::{UserStore, UserStoreError};

pub use error::{UserAuthError, ValidationError};

/// Result type for account flows.
pub type Result<T> = std::result::Result<T, UserAuthError>;

#[derive(Clone)]
pub struct UserAuthService {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl UserAuthService {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account and sign the first session token.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession> {
        validation::validate_registration(username, email, password)?;

        if self.users.exists_by_email(email).await? {
            return Err(UserAuthError::UserAlreadyExists);
        }
        if self.users.exists_by_username(username).await? {
            return Err(UserAuthError::UserAlreadyExists);
        }

        let password_hash = self.tokens.hash_password(password)?;
        let record = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                UserStoreError::AlreadyExists => UserAuthError::UserAlreadyExists,
                other => UserAuthError::Store(other),
            })?;

        info!(user_id = record.id, username = %record.username, "user registered");
        self.session_for(&record)
    }

    /// `identifier` is treated as an email when it looks like one, otherwise
    /// as a username. Unknown users and wrong passwords are indistinguishable.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthSession> {
        if identifier.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingCredentials.into());
        }

        let by_email = validation::is_email(identifier);
        let found = if by_email {
            self.users.find_by_email(identifier).await
        } else {
            self.users.find_by_username(identifier).await
        };
        let record = match found {
            Ok(record) => record,
            Err(UserStoreError::NotFound) => {
                warn!(by_email, "login for unknown user");
                return Err(UserAuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if self
            .tokens
            .verify_password(&record.password_hash, password)
            .is_err()
        {
            warn!(user_id = record.id, "login with wrong password");
            return Err(UserAuthError::InvalidCredentials);
        }

        info!(user_id = record.id, "user logged in");
        self.session_for(&record)
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<Profile> {
        if user_id <= 0 {
            return Err(UserAuthError::UserNotFound);
        }
        Ok(self.find_user(user_id).await?.into())
    }

    /// Verify a token and resolve its user. A well-formed token for a user
    /// that no longer exists yields `UserNotFound`.
    pub async fn validate_token(&self, token: &str) -> Result<User> {
        let claims = self.tokens.validate_token(token)?;
        let record = self.find_user(claims.user_id).await?;
        Ok(User::from(&record))
    }

    /// Renew a session, accepting authentic tokens past their expiry.
    pub async fn refresh_token(&self, token: &str) -> Result<AuthSession> {
        let fresh = self.tokens.refresh_token(token)?;
        let claims: Claims = self.tokens.validate_token(&fresh.token)?;
        let record = self.find_user(claims.user_id).await?;
        Ok(AuthSession {
            user: User::from(&record),
            token: fresh.token,
        })
    }

    async fn find_user(&self, user_id: i64) -> Result<UserRecord> {
        self.users.find_by_id(user_id).await.map_err(|e| match e {
            UserStoreError::NotFound | UserStoreError::InvalidId(_) => UserAuthError::UserNotFound,
            other => UserAuthError::Store(other),
        })
    }

    fn session_for(&self, record: &UserRecord) -> Result<AuthSession> {
        let info = self
            .tokens
            .generate_token(record.id, &record.username, &record.email)?;
        Ok(AuthSession {
            user: User::from(record),
            token: info.token,
        })
    }
}

impl std::fmt::Debug for UserAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAuthService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
