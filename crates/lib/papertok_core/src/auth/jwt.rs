//! JWT session token issue, validation, and refresh.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use tracing::debug;

use super::{AuthError, PasswordHasher, TokenConfig};
use crate::models::auth::{Claims, TokenInfo};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and validates HS256 session tokens and hashes passwords.
///
/// Constructed once at startup and shared by handle; there is no runtime
/// reconfiguration.
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    hasher: PasswordHasher,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("access_token_expiry", &self.config.access_token_expiry)
            .field("password_cost", &self.config.password_cost)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build the service, failing fast if `config` violates any invariant.
    pub fn new(config: TokenConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: TokenConfig) -> Self {
        Self {
            hasher: PasswordHasher::new(config.password_cost),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    /// Skips validation so tests can issue already-expired tokens.
    #[cfg(test)]
    pub(crate) fn new_unchecked(config: TokenConfig) -> Self {
        Self::from_config(config)
    }

    pub fn access_token_expiry(&self) -> Duration {
        self.config.access_token_expiry
    }

    pub fn refresh_token_expiry(&self) -> Duration {
        self.config.refresh_token_expiry
    }

    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    /// Hash a password with the configured bcrypt cost.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.hasher.hash(password)
    }

    /// Verify a password against its stored hash.
    pub fn verify_password(&self, hash: &str, password: &str) -> Result<(), AuthError> {
        self.hasher.verify(hash, password)
    }

    /// Sign a token for the given user, valid for the access-token lifetime.
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        email: &str,
    ) -> Result<TokenInfo, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.config.access_token_expiry)
            .ok_or_else(|| AuthError::TokenGenerationFailed("expiry out of range".into()))?;
        let claims = Claims {
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationFailed(e.to_string()))?;
        Ok(TokenInfo { token, expires_at })
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_claims(token, true)
    }

    /// Issue a fresh token from an existing one.
    ///
    /// Expired tokens are renewed as long as their signature checks out;
    /// every other validation failure is returned as-is.
    pub fn refresh_token(&self, token: &str) -> Result<TokenInfo, AuthError> {
        let claims = match self.validate_token(token) {
            Ok(claims) => claims,
            Err(AuthError::ExpiredToken) => {
                debug!("renewing expired token within grace policy");
                self.decode_claims(token, false)?
            }
            Err(e) => return Err(e),
        };
        self.generate_token(claims.user_id, &claims.username, &claims.email)
    }

    fn decode_claims(&self, token: &str, check_expiry: bool) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if header.alg != ALGORITHM {
            return Err(AuthError::InvalidToken(format!(
                "unexpected signing method: {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}
