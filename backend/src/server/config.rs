//! HTTP server configuration object and helpers.
//!
//! All environment variables are read once here, at bootstrap. Everything
//! downstream receives plain values, so call sites never branch on
//! configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use rand::RngCore;
use tracing::warn;
use url::Url;

use crate::domain::UploadLimits;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: String,
    pub(crate) upload_dir: PathBuf,
    pub(crate) blob_store_url: Option<Url>,
    pub(crate) jwt_secret: Vec<u8>,
    pub(crate) upload_limits: UploadLimits,
}

/// Configuration errors raised during bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `BIND_ADDR` could not be parsed as a socket address.
    #[error("invalid BIND_ADDR '{value}': {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    /// `BLOB_STORE_URL` was set but is not a valid URL.
    #[error("invalid BLOB_STORE_URL '{value}': {source}")]
    BlobStoreUrl {
        value: String,
        source: url::ParseError,
    },
    /// No JWT secret is configured and ephemeral secrets are disallowed.
    #[error("JWT_SECRET is not set; set it or allow an ephemeral dev secret")]
    MissingJwtSecret,
}

impl ServerConfig {
    /// Construct a configuration with explicit values (tests, embedding).
    #[must_use]
    pub fn new(bind_addr: SocketAddr, database_url: impl Into<String>, jwt_secret: Vec<u8>) -> Self {
        Self {
            bind_addr,
            database_url: database_url.into(),
            upload_dir: PathBuf::from("uploads"),
            blob_store_url: None,
            jwt_secret,
            upload_limits: UploadLimits::default(),
        }
    }

    /// Read the full configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
        let bind_addr = bind_raw.parse().map_err(|source| ConfigError::BindAddr {
            value: bind_raw.clone(),
            source,
        })?;

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "vault.db".into());
        let upload_dir = env::var("UPLOAD_DIR").map_or_else(|_| PathBuf::from("uploads"), PathBuf::from);

        let blob_store_url = match env::var("BLOB_STORE_URL") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(Url::parse(&raw).map_err(|source| ConfigError::BlobStoreUrl {
                    value: raw,
                    source,
                })?)
            }
            _ => None,
        };

        let jwt_secret = load_jwt_secret()?;

        Ok(Self {
            bind_addr,
            database_url,
            upload_dir,
            blob_store_url,
            jwt_secret,
            upload_limits: UploadLimits::default(),
        })
    }

    /// Serve blobs from a remote object store instead of the local disk.
    #[must_use]
    pub fn with_blob_store(mut self, base: Url) -> Self {
        self.blob_store_url = Some(base);
        self
    }

    /// Override the local uploads directory.
    #[must_use]
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Override the upload size ceilings.
    #[must_use]
    pub fn with_upload_limits(mut self, limits: UploadLimits) -> Self {
        self.upload_limits = limits;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

/// Resolve the token signing secret. Production deployments must set
/// `JWT_SECRET`; debug builds (or `JWT_ALLOW_EPHEMERAL=1`) fall back to a
/// random per-process secret, which invalidates tokens on restart.
fn load_jwt_secret() -> Result<Vec<u8>, ConfigError> {
    if let Ok(secret) = env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return Ok(secret.into_bytes());
    }
    let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
    if cfg!(debug_assertions) || allow_dev {
        warn!("using ephemeral JWT secret (dev only); tokens reset on restart");
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        return Ok(secret);
    }
    Err(ConfigError::MissingJwtSecret)
}
