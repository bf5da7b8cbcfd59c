//! Bearer-token authentication extractor.
//!
//! Handlers declare an [`Identity`] parameter and receive the verified
//! owner id. The split the API contract requires: absent credentials are
//! `401 Unauthorized`, presented-but-invalid (or expired) credentials are
//! `403 Forbidden`.

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{DomainError, UserId};

use super::error::ApiError;

/// Token verifier registered as application data at server build time.
#[derive(Clone)]
pub struct AuthTokens(Arc<dyn TokenService>);

impl AuthTokens {
    /// Wrap the token service for registration via `app_data`.
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self(tokens)
    }

    /// Verify a raw bearer token.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.0.verify(token)
    }
}

/// The authenticated owner of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub UserId);

impl Identity {
    /// The owner id every repository lookup is scoped by.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.0
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, ApiError> {
    let tokens = req
        .app_data::<web::Data<AuthTokens>>()
        .ok_or_else(|| ApiError::from(DomainError::internal("token verifier not configured")))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::from(DomainError::unauthorized("missing authorization header")))?;
    let raw = header_value
        .to_str()
        .map_err(|_| ApiError::from(DomainError::unauthorized("malformed authorization header")))?;
    let token = raw
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::from(DomainError::unauthorized("expected a bearer token")))?;

    match tokens.verify(token.trim()) {
        Ok(owner) => Ok(Identity(owner)),
        Err(TokenError::Expired) => Err(DomainError::forbidden("token has expired").into()),
        Err(TokenError::Invalid) => Err(DomainError::forbidden("token is invalid").into()),
    }
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
