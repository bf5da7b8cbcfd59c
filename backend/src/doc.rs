//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all HTTP paths from the inbound layer, the request and
//! response schemas, and the bearer token security scheme. The generated
//! document backs Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::accounts::{AuthResponse, LoginRequest, RegisterRequest};
use crate::inbound::http::documents::DocumentResponse;
use crate::inbound::http::error::ApiError;
use crate::inbound::http::passwords::{EntryRequest, EntryResponse};
use crate::inbound::http::profile::{ChangePasswordRequest, ProfileRequest, ProfileResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Strongroom API",
        description = "HTTP interface for the password and document vault.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::passwords::list,
        crate::inbound::http::passwords::create,
        crate::inbound::http::passwords::get,
        crate::inbound::http::passwords::update,
        crate::inbound::http::passwords::remove,
        crate::inbound::http::documents::list,
        crate::inbound::http::documents::get,
        crate::inbound::http::documents::upload,
        crate::inbound::http::documents::download,
        crate::inbound::http::documents::remove,
        crate::inbound::http::profile::get_profile,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::profile::upload_avatar,
        crate::inbound::http::profile::delete_avatar,
        crate::inbound::http::profile::change_password,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        EntryRequest,
        EntryResponse,
        DocumentResponse,
        ProfileRequest,
        ProfileResponse,
        ChangePasswordRequest,
        ApiError,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "passwords", description = "Credential entries"),
        (name = "documents", description = "Uploaded documents"),
        (name = "user", description = "Account profile and avatar"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
