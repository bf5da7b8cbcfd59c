//! Bcrypt implementation of the password hashing port.

use crate::domain::ports::PasswordHasher;
use crate::domain::{DomainError, ErrorCode};

/// Password hasher backed by the `bcrypt` crate.
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher at the library's default cost.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Hasher at a reduced cost. Only sensible in tests, where the default
    /// cost dominates runtime.
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
        bcrypt::hash(plaintext, self.cost).map_err(|err| {
            tracing::error!(error = %err, "bcrypt hashing failed");
            DomainError::new(ErrorCode::InternalError, "failed to hash password")
        })
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }
}
