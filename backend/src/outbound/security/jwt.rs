//! JWT implementation of the bearer token port.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{DomainError, ErrorCode, UserId};

/// Default token lifetime.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the owning user's id.
    sub: String,
    /// Expiry as a unix timestamp.
    exp: i64,
    /// Issued-at as a unix timestamp.
    iat: i64,
}

/// Token service signing HS256 JWTs.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    /// Build the service from the shared signing secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Override the token lifetime (expiry tests).
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: UserId) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            tracing::error!(error = %err, "failed to sign token");
            DomainError::new(ErrorCode::InternalError, "failed to issue token")
        })
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        UserId::parse(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}
