//! Password entry HTTP handlers.
//!
//! ```text
//! GET    /api/passwords
//! POST   /api/passwords
//! GET    /api/passwords/{id}
//! PUT    /api/passwords/{id}
//! DELETE /api/passwords/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{EntryDraft, PasswordEntry};

use super::auth::Identity;
use super::error::ApiResult;
use super::state::HttpState;

/// Request payload for creating or replacing an entry.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    pub title: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl From<EntryRequest> for EntryDraft {
    fn from(value: EntryRequest) -> Self {
        Self {
            title: value.title,
            username: value.username,
            secret: value.secret,
            website: value.website,
            category: value.category,
            notes: value.notes,
        }
    }
}

/// Response payload for a stored entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PasswordEntry> for EntryResponse {
    fn from(value: PasswordEntry) -> Self {
        Self {
            id: value.id,
            title: value.title,
            username: value.username,
            secret: value.secret,
            website: value.website,
            category: value.category.to_string(),
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// List the owner's entries, newest first.
#[utoipa::path(
    get,
    path = "/api/passwords",
    responses(
        (status = 200, description = "Entries for the authenticated owner", body = [EntryResponse]),
        (status = 401, description = "Missing credentials"),
        (status = 403, description = "Invalid credentials")
    ),
    tags = ["passwords"],
    operation_id = "listPasswords"
)]
#[get("/passwords")]
pub async fn list(state: web::Data<HttpState>, identity: Identity) -> ApiResult<HttpResponse> {
    let entries = state.passwords.list(identity.owner()).await?;
    let body: Vec<EntryResponse> = entries.into_iter().map(EntryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch a single owned entry.
#[utoipa::path(
    get,
    path = "/api/passwords/{id}",
    responses(
        (status = 200, description = "The entry", body = EntryResponse),
        (status = 404, description = "Unknown or foreign entry")
    ),
    tags = ["passwords"],
    operation_id = "getPassword"
)]
#[get("/passwords/{id}")]
pub async fn get(
    state: web::Data<HttpState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let entry = state
        .passwords
        .get(id.into_inner(), identity.owner())
        .await?;
    Ok(HttpResponse::Ok().json(EntryResponse::from(entry)))
}

/// Create an entry; `title` and `secret` are required.
#[utoipa::path(
    post,
    path = "/api/passwords",
    request_body = EntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryResponse),
        (status = 400, description = "Missing required field")
    ),
    tags = ["passwords"],
    operation_id = "createPassword"
)]
#[post("/passwords")]
pub async fn create(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<EntryRequest>,
) -> ApiResult<HttpResponse> {
    let entry = state
        .passwords
        .create(identity.owner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(EntryResponse::from(entry)))
}

/// Replace an owned entry's fields.
#[utoipa::path(
    put,
    path = "/api/passwords/{id}",
    request_body = EntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Missing required field"),
        (status = 404, description = "Unknown or foreign entry")
    ),
    tags = ["passwords"],
    operation_id = "updatePassword"
)]
#[put("/passwords/{id}")]
pub async fn update(
    state: web::Data<HttpState>,
    identity: Identity,
    id: web::Path<Uuid>,
    payload: web::Json<EntryRequest>,
) -> ApiResult<HttpResponse> {
    let entry = state
        .passwords
        .update(id.into_inner(), identity.owner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(EntryResponse::from(entry)))
}

/// Delete an owned entry.
#[utoipa::path(
    delete,
    path = "/api/passwords/{id}",
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Unknown or foreign entry")
    ),
    tags = ["passwords"],
    operation_id = "deletePassword"
)]
#[delete("/passwords/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .passwords
        .delete(id.into_inner(), identity.owner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
