//! Server construction and middleware wiring.

mod config;

pub use config::{ConfigError, ServerConfig};

use std::sync::Arc;

use actix_files::Files;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::BlobStore;
use crate::domain::{
    AccountService, DocumentService, PasswordEntryService, ProfileService, UploadLimits,
};
use crate::inbound::http::health::{live, ready};
use crate::inbound::http::{AuthTokens, HealthState, HttpState, api_routes};
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DbPool, DieselDocumentRepository, DieselPasswordEntryRepository, DieselUserRepository,
    run_migrations,
};
use crate::outbound::security::{BcryptPasswordHasher, JwtTokenService};
use crate::outbound::storage::{LocalBlobStore, RemoteBlobStore};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    auth_tokens: web::Data<AuthTokens>,
    upload_limits: web::Data<UploadLimits>,
    /// Local uploads root to serve statically; `None` with a remote store.
    static_uploads: Option<std::path::PathBuf>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        auth_tokens,
        upload_limits,
        static_uploads,
    } = deps;

    let mut app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(auth_tokens)
        .app_data(upload_limits)
        .wrap(Trace)
        .configure(api_routes)
        .service(ready)
        .service(live);

    if let Some(root) = static_uploads {
        app = app.service(Files::new("/uploads", root));
    }

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Set up the blob store named by the configuration.
async fn build_blob_store(
    config: &ServerConfig,
) -> std::io::Result<(Arc<dyn BlobStore>, Option<std::path::PathBuf>)> {
    if let Some(base) = &config.blob_store_url {
        info!(base = %base, "using remote blob store");
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(std::io::Error::other)?;
        return Ok((Arc::new(RemoteBlobStore::new(client, base.clone())), None));
    }
    info!(root = %config.upload_dir.display(), "using local blob store");
    let store = LocalBlobStore::create(config.upload_dir.clone()).await?;
    Ok((Arc::new(store), Some(config.upload_dir.clone())))
}

/// Wire the use-case services over their adapters.
fn build_http_state(
    pool: &DbPool,
    blobs: Arc<dyn BlobStore>,
    tokens: Arc<JwtTokenService>,
    limits: UploadLimits,
) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let hasher = Arc::new(BcryptPasswordHasher::new());

    let accounts = AccountService::new(users.clone(), hasher.clone(), tokens);
    let passwords =
        PasswordEntryService::new(Arc::new(DieselPasswordEntryRepository::new(pool.clone())));
    let documents = DocumentService::new(
        Arc::new(DieselDocumentRepository::new(pool.clone())),
        blobs.clone(),
        limits.document_max_bytes,
    );
    let profile = ProfileService::new(users, blobs, hasher, limits.avatar_max_bytes);

    HttpState::new(
        Arc::new(accounts),
        Arc::new(passwords),
        Arc::new(documents),
        Arc::new(profile),
    )
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// Opens the database pool, applies pending migrations, sets up the blob
/// store, and binds the listener. The returned [`Server`] must be awaited
/// to drive connections.
///
/// # Errors
/// Propagates [`std::io::Error`] when the database, storage root, or
/// socket cannot be initialised.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let pool = DbPool::new(&config.database_url).map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    let (blobs, static_uploads) = build_blob_store(&config).await?;
    let tokens = Arc::new(JwtTokenService::new(&config.jwt_secret));
    let http_state = web::Data::new(build_http_state(
        &pool,
        blobs,
        tokens.clone(),
        config.upload_limits,
    ));
    let auth_tokens = web::Data::new(AuthTokens::new(tokens));
    let upload_limits = web::Data::new(config.upload_limits);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            auth_tokens: auth_tokens.clone(),
            upload_limits: upload_limits.clone(),
            static_uploads: static_uploads.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
