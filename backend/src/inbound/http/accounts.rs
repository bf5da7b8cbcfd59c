//! Registration and login HTTP handlers.
//!
//! ```text
//! POST /api/auth/register
//! POST /api/auth/login
//! ```
//!
//! The only unauthenticated routes besides the health probes.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuthenticatedAccount, DomainError};

use super::error::ApiResult;
use super::profile::ProfileResponse;
use super::state::HttpState;

/// Request payload for account registration.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

/// Request payload for login.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response payload carrying the bearer token and the account profile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: ProfileResponse,
}

impl From<AuthenticatedAccount> for AuthResponse {
    fn from(value: AuthenticatedAccount) -> Self {
        Self {
            token: value.token,
            user: ProfileResponse::from(value.user),
        }
    }
}

fn required_field(value: Option<String>, field: &str) -> Result<String, DomainError> {
    value.ok_or_else(|| DomainError::invalid_request(format!("{field} is required")))
}

/// Create an account and issue its first token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already registered")
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = required_field(payload.email, "email")?;
    let password = required_field(payload.password, "password")?;
    let display_name = required_field(payload.display_name, "displayName")?;
    let account = state
        .accounts
        .register(&email, &password, &display_name)
        .await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(account)))
}

/// Verify credentials and issue a token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Unknown email or wrong password")
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = required_field(payload.email, "email")?;
    let password = required_field(payload.password, "password")?;
    let account = state.accounts.login(&email, &password).await?;
    Ok(HttpResponse::Ok().json(AuthResponse::from(account)))
}
