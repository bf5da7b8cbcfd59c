//! Registration and login use-cases.
//!
//! Thin by design: credential hashing and token issuance delegate to the
//! [`PasswordHasher`] and [`TokenService`] ports. Login failures never say
//! whether the email or the password was wrong.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::DomainError;
use super::password_service::map_repository_error;
use super::ports::{PasswordHasher, TokenService, UserRepository};
use super::user::{User, UserId, validate_display_name, validate_email};

/// Outcome of a successful login or registration.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedAccount {
    pub user: User,
    pub token: String,
}

/// Driving port for account creation and authentication.
#[async_trait]
pub trait AccountOps: Send + Sync {
    /// Register a new account and issue its first token.
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthenticatedAccount, DomainError>;

    /// Verify credentials and issue a token.
    async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedAccount, DomainError>;
}

/// Service implementing [`AccountOps`].
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl<U> AccountService<U> {
    /// Create a new service over the user repository and security ports.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

fn bad_credentials() -> DomainError {
    DomainError::unauthorized("invalid email or password")
}

#[async_trait]
impl<U> AccountOps for AccountService<U>
where
    U: UserRepository,
{
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthenticatedAccount, DomainError> {
        let email = validate_email(email).map_err(|err| DomainError::invalid_request(err.to_string()))?;
        let display_name = validate_display_name(display_name)
            .map_err(|err| DomainError::invalid_request(err.to_string()))?;
        if password.trim().is_empty() {
            return Err(DomainError::invalid_request("password is required"));
        }

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_repository_error)?
            .is_some()
        {
            return Err(DomainError::conflict("email is already registered"));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::random(),
            email,
            display_name,
            password_hash: self.hasher.hash(password)?,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        self.users
            .insert(&user)
            .await
            .map_err(map_repository_error)?;
        let token = self.tokens.issue(user.id)?;
        Ok(AuthenticatedAccount { user, token })
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedAccount, DomainError> {
        let email = validate_email(email).map_err(|_| bad_credentials())?;
        let Some(user) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_repository_error)?
        else {
            return Err(bad_credentials());
        };
        if !self.hasher.verify(password, &user.password_hash) {
            return Err(bad_credentials());
        }
        let token = self.tokens.issue(user.id)?;
        Ok(AuthenticatedAccount { user, token })
    }
}
