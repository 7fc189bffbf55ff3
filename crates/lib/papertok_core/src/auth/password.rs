//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt hasher with a fixed cost factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with the configured cost.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a bcrypt hash.
    ///
    /// A mismatch and an unreadable hash both report `InvalidPassword`.
    pub fn verify(&self, hash: &str, password: &str) -> Result<(), AuthError> {
        match bcrypt::verify(password, hash) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(AuthError::InvalidPassword),
        }
    }
}
