//! Diesel-backed user account repository.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users::dsl;
use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{Locator, User, UserId};

/// SQLite adapter for [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Build the adapter over a shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: String) -> Result<Option<User>, RepositoryError> {
        let row = self
            .pool
            .run(move |conn| {
                dsl::users
                    .filter(dsl::id.eq(id))
                    .select(UserRow::as_select())
                    .first(conn)
                    .optional()
            })
            .await?;
        row.map(UserRow::into_domain).transpose()
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.fetch_by_id(id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let email = email.to_owned();
        let row = self
            .pool
            .run(move |conn| {
                dsl::users
                    .filter(dsl::email.eq(email))
                    .select(UserRow::as_select())
                    .first(conn)
                    .optional()
            })
            .await?;
        row.map(UserRow::into_domain).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let user = user.clone();
        self.pool
            .run(move |conn| {
                diesel::insert_into(dsl::users)
                    .values(NewUserRow::from_domain(&user))
                    .execute(conn)
                    .map(|_| ())
            })
            .await
    }

    async fn update_profile(
        &self,
        id: UserId,
        email: &str,
        display_name: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let user_id = id.to_string();
        let email = email.to_owned();
        let display_name = display_name.to_owned();
        let changed = {
            let user_id = user_id.clone();
            self.pool
                .run(move |conn| {
                    diesel::update(dsl::users.filter(dsl::id.eq(&user_id)))
                        .set((
                            dsl::email.eq(&email),
                            dsl::display_name.eq(&display_name),
                            dsl::updated_at.eq(Utc::now().naive_utc()),
                        ))
                        .execute(conn)
                })
                .await?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.fetch_by_id(user_id).await
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<&Locator>,
    ) -> Result<Option<User>, RepositoryError> {
        let user_id = id.to_string();
        let avatar = avatar.map(|locator| locator.as_str().to_owned());
        let changed = {
            let user_id = user_id.clone();
            self.pool
                .run(move |conn| {
                    diesel::update(dsl::users.filter(dsl::id.eq(&user_id)))
                        .set((
                            dsl::avatar.eq(avatar.as_deref()),
                            dsl::updated_at.eq(Utc::now().naive_utc()),
                        ))
                        .execute(conn)
                })
                .await?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.fetch_by_id(user_id).await
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<bool, RepositoryError> {
        let user_id = id.to_string();
        let hash = hash.to_owned();
        let changed = self
            .pool
            .run(move |conn| {
                diesel::update(dsl::users.filter(dsl::id.eq(user_id)))
                    .set((
                        dsl::password_hash.eq(hash),
                        dsl::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
            })
            .await?;
        Ok(changed > 0)
    }
}
