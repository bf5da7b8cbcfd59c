//! Account profile HTTP handlers.
//!
//! ```text
//! GET    /api/user/profile
//! PUT    /api/user/profile
//! POST   /api/user/avatar          (multipart field `avatar`)
//! DELETE /api/user/avatar
//! PUT    /api/user/change-password
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DomainError, ProfileUpdate, UploadLimits, User};

use super::auth::Identity;
use super::error::ApiResult;
use super::multipart::read_single_file;
use super::state::HttpState;

/// Profile fields returned to the client. The password hash never leaves
/// the server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: String,
}

impl From<User> for ProfileResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email,
            display_name: value.display_name,
            avatar: value.avatar.map(|locator| locator.as_str().to_owned()),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for profile updates; absent fields stay untouched.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Request payload for a password change.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Fetch the authenticated account's profile.
#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses((status = 200, description = "The profile", body = ProfileResponse)),
    tags = ["user"],
    operation_id = "getProfile"
)]
#[get("/user/profile")]
pub async fn get_profile(state: web::Data<HttpState>, identity: Identity) -> ApiResult<HttpResponse> {
    let user = state.profile.get(identity.owner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// Update profile fields.
#[utoipa::path(
    put,
    path = "/api/user/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid email or display name")
    ),
    tags = ["user"],
    operation_id = "updateProfile"
)]
#[put("/user/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = state
        .profile
        .update(
            identity.owner(),
            ProfileUpdate {
                email: payload.email,
                display_name: payload.display_name,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// Upload a new avatar under the `avatar` field.
#[utoipa::path(
    post,
    path = "/api/user/avatar",
    responses(
        (status = 200, description = "Profile with the new avatar", body = ProfileResponse),
        (status = 400, description = "No file, oversize, or not an image")
    ),
    tags = ["user"],
    operation_id = "uploadAvatar"
)]
#[post("/user/avatar")]
pub async fn upload_avatar(
    state: web::Data<HttpState>,
    limits: web::Data<UploadLimits>,
    identity: Identity,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let file = read_single_file(payload, "avatar", limits.avatar_max_bytes).await?;
    let user = state.profile.set_avatar(identity.owner(), file).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// Remove the current avatar.
#[utoipa::path(
    delete,
    path = "/api/user/avatar",
    responses((status = 200, description = "Profile without an avatar", body = ProfileResponse)),
    tags = ["user"],
    operation_id = "deleteAvatar"
)]
#[delete("/user/avatar")]
pub async fn delete_avatar(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<HttpResponse> {
    let user = state.profile.delete_avatar(identity.owner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// Change the account password after verifying the current one.
#[utoipa::path(
    put,
    path = "/api/user/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Missing fields or wrong current password")
    ),
    tags = ["user"],
    operation_id = "changePassword"
)]
#[put("/user/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let current = payload
        .current_password
        .ok_or_else(|| DomainError::invalid_request("currentPassword is required"))?;
    let replacement = payload
        .new_password
        .ok_or_else(|| DomainError::invalid_request("newPassword is required"))?;
    state
        .profile
        .change_password(identity.owner(), &current, &replacement)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
