//! Inbound HTTP adapter: handlers, DTOs, authentication extractor, and the
//! API error envelope.

pub mod accounts;
pub mod auth;
pub mod documents;
pub mod error;
pub mod health;
pub mod multipart;
pub mod passwords;
pub mod profile;
pub mod state;

pub use auth::{AuthTokens, Identity};
pub use error::{ApiError, ApiResult};
pub use health::HealthState;
pub use state::HttpState;

use actix_web::web;

/// Mount the `/api` surface onto a service config.
///
/// The caller registers [`HttpState`], [`AuthTokens`], and
/// [`crate::domain::UploadLimits`] as application data before applying
/// this.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(accounts::register)
            .service(accounts::login)
            .service(passwords::list)
            .service(passwords::create)
            .service(passwords::get)
            .service(passwords::update)
            .service(passwords::remove)
            .service(documents::list)
            .service(documents::upload)
            .service(documents::download)
            .service(documents::get)
            .service(documents::remove)
            .service(profile::get_profile)
            .service(profile::update_profile)
            .service(profile::upload_avatar)
            .service(profile::delete_avatar)
            .service(profile::change_password),
    );
}
