//! Shared fixtures for unit and integration tests.
//!
//! Only compiled for tests or behind the `test-support` feature so fixture
//! helpers never leak into release builds.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::ports::{TokenService, UserRepository};
use crate::domain::{
    AccountService, DocumentService, PasswordEntryService, ProfileService, UploadLimits, User,
    UserId,
};
use crate::inbound::http::{AuthTokens, HttpState};
use crate::outbound::persistence::{
    DbPool, DieselDocumentRepository, DieselPasswordEntryRepository, DieselUserRepository,
    run_migrations,
};
use crate::outbound::security::{BcryptPasswordHasher, JwtTokenService};
use crate::outbound::storage::LocalBlobStore;

/// Bcrypt cost for tests. The default cost dominates test runtime.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Fresh migrated SQLite pool backed by a file in a kept temp directory.
/// The OS reclaims the directory; tests never share a database.
#[must_use]
pub fn test_pool() -> DbPool {
    let dir = tempfile::tempdir().expect("create temp dir").keep();
    let database = dir.join("vault.db");
    let pool = DbPool::new(&database.to_string_lossy()).expect("open test pool");
    run_migrations(&pool).expect("run migrations");
    pool
}

/// Insert a user row and return its id. Owned rows reference `users(id)`
/// with foreign keys enforced, so repository fixtures need a real owner.
pub async fn seed_user(pool: &DbPool) -> UserId {
    let id = UserId::random();
    let now = Utc::now();
    let user = User {
        id,
        email: format!("{id}@fixtures.example"),
        display_name: "Fixture Owner".to_owned(),
        password_hash: "$2b$04$unverifiable-fixture-hash".to_owned(),
        avatar: None,
        created_at: now,
        updated_at: now,
    };
    DieselUserRepository::new(pool.clone())
        .insert(&user)
        .await
        .expect("insert fixture user");
    id
}

/// Fully wired application state over real adapters: SQLite persistence,
/// a local blob store under a temp directory, bcrypt, and JWT tokens.
pub struct TestHarness {
    pub http_state: HttpState,
    pub auth_tokens: AuthTokens,
    pub tokens: Arc<JwtTokenService>,
    pub upload_limits: UploadLimits,
    pub uploads_root: PathBuf,
}

impl TestHarness {
    /// Bearer header value for an arbitrary user id.
    #[must_use]
    pub fn bearer_for(&self, user: UserId) -> String {
        let token = self.tokens.issue(user).expect("issue token");
        format!("Bearer {token}")
    }
}

/// Build a harness with the default upload ceilings.
pub async fn harness() -> TestHarness {
    harness_with_limits(UploadLimits::default()).await
}

/// Build a harness with explicit upload ceilings (oversize tests).
pub async fn harness_with_limits(limits: UploadLimits) -> TestHarness {
    let pool = test_pool();
    let uploads_root = tempfile::tempdir().expect("create uploads dir").keep();
    let blobs: Arc<dyn crate::domain::ports::BlobStore> = Arc::new(
        LocalBlobStore::create(uploads_root.clone())
            .await
            .expect("create blob store"),
    );

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let hasher = Arc::new(BcryptPasswordHasher::with_cost(TEST_BCRYPT_COST));
    let tokens = Arc::new(JwtTokenService::new(b"test-signing-secret"));

    let accounts = AccountService::new(users.clone(), hasher.clone(), tokens.clone());
    let passwords =
        PasswordEntryService::new(Arc::new(DieselPasswordEntryRepository::new(pool.clone())));
    let documents = DocumentService::new(
        Arc::new(DieselDocumentRepository::new(pool.clone())),
        blobs.clone(),
        limits.document_max_bytes,
    );
    let profile = ProfileService::new(users, blobs, hasher, limits.avatar_max_bytes);

    TestHarness {
        http_state: HttpState::new(
            Arc::new(accounts),
            Arc::new(passwords),
            Arc::new(documents),
            Arc::new(profile),
        ),
        auth_tokens: AuthTokens::new(tokens.clone()),
        tokens,
        upload_limits: limits,
        uploads_root,
    }
}
