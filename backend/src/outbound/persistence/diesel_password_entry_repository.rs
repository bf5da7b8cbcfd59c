//! Diesel-backed password entry repository.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use super::models::{NewPasswordEntryRow, PasswordEntryRow};
use super::pool::DbPool;
use super::schema::password_entries::dsl;
use crate::domain::ports::{PasswordEntryRepository, RepositoryError};
use crate::domain::{PasswordEntry, UserId};
use crate::domain::password_entry::ValidatedEntry;

/// SQLite adapter for [`PasswordEntryRepository`].
#[derive(Clone)]
pub struct DieselPasswordEntryRepository {
    pool: DbPool,
}

impl DieselPasswordEntryRepository {
    /// Build the adapter over a shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordEntryRepository for DieselPasswordEntryRepository {
    async fn list(&self, owner: UserId) -> Result<Vec<PasswordEntry>, RepositoryError> {
        let owner = owner.to_string();
        let rows = self
            .pool
            .run(move |conn| {
                dsl::password_entries
                    .filter(dsl::owner_id.eq(owner))
                    .order(dsl::created_at.desc())
                    .select(PasswordEntryRow::as_select())
                    .load(conn)
            })
            .await?;
        rows.into_iter().map(PasswordEntryRow::into_domain).collect()
    }

    async fn find(
        &self,
        id: Uuid,
        owner: UserId,
    ) -> Result<Option<PasswordEntry>, RepositoryError> {
        let id = id.to_string();
        let owner = owner.to_string();
        let row = self
            .pool
            .run(move |conn| {
                dsl::password_entries
                    .filter(dsl::id.eq(id))
                    .filter(dsl::owner_id.eq(owner))
                    .select(PasswordEntryRow::as_select())
                    .first(conn)
                    .optional()
            })
            .await?;
        row.map(PasswordEntryRow::into_domain).transpose()
    }

    async fn insert(&self, entry: &PasswordEntry) -> Result<(), RepositoryError> {
        let entry = entry.clone();
        self.pool
            .run(move |conn| {
                diesel::insert_into(dsl::password_entries)
                    .values(NewPasswordEntryRow::from_domain(&entry))
                    .execute(conn)
                    .map(|_| ())
            })
            .await
    }

    async fn update(
        &self,
        id: Uuid,
        owner: UserId,
        fields: &ValidatedEntry,
    ) -> Result<Option<PasswordEntry>, RepositoryError> {
        let entry_id = id.to_string();
        let owner_id = owner.to_string();
        let fields = fields.clone();
        let updated = self
            .pool
            .run(move |conn| {
                let now = Utc::now().naive_utc();
                let changed = diesel::update(
                    dsl::password_entries
                        .filter(dsl::id.eq(&entry_id))
                        .filter(dsl::owner_id.eq(&owner_id)),
                )
                .set((
                    dsl::title.eq(&fields.title),
                    dsl::username.eq(fields.username.as_deref()),
                    dsl::secret.eq(&fields.secret),
                    dsl::website.eq(fields.website.as_deref()),
                    dsl::category.eq(fields.category.as_str()),
                    dsl::notes.eq(fields.notes.as_deref()),
                    dsl::updated_at.eq(now),
                ))
                .execute(conn)?;
                if changed == 0 {
                    return Ok(None);
                }
                dsl::password_entries
                    .filter(dsl::id.eq(&entry_id))
                    .select(PasswordEntryRow::as_select())
                    .first(conn)
                    .optional()
            })
            .await?;
        updated.map(PasswordEntryRow::into_domain).transpose()
    }

    async fn delete(&self, id: Uuid, owner: UserId) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        let owner = owner.to_string();
        let removed = self
            .pool
            .run(move |conn| {
                diesel::delete(
                    dsl::password_entries
                        .filter(dsl::id.eq(id))
                        .filter(dsl::owner_id.eq(owner)),
                )
                .execute(conn)
            })
            .await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::Category;
    use crate::test_support::{seed_user, test_pool};

    fn entry_for(owner: UserId, title: &str, offset_secs: i64) -> PasswordEntry {
        let at = Utc::now() + Duration::seconds(offset_secs);
        PasswordEntry {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: title.to_owned(),
            username: Some("alice".to_owned()),
            secret: "s3cret".to_owned(),
            website: None,
            category: Category::Banking,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn lists_newest_first_for_owner_only() {
        let pool = test_pool();
        let owner = seed_user(&pool).await;
        let other = seed_user(&pool).await;
        let repo = DieselPasswordEntryRepository::new(pool);

        repo.insert(&entry_for(owner, "oldest", 0)).await.unwrap();
        repo.insert(&entry_for(owner, "newest", 60)).await.unwrap();
        repo.insert(&entry_for(other, "foreign", 120)).await.unwrap();

        let listed = repo.list(owner).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["newest", "oldest"]);
    }

    #[rstest]
    #[actix_rt::test]
    async fn update_scoped_to_owner() {
        let pool = test_pool();
        let owner = seed_user(&pool).await;
        let repo = DieselPasswordEntryRepository::new(pool);
        let entry = entry_for(owner, "bank", 0);
        repo.insert(&entry).await.unwrap();

        let fields = ValidatedEntry {
            title: "bank (renamed)".to_owned(),
            username: None,
            secret: "rotated".to_owned(),
            website: Some("https://bank.example".to_owned()),
            category: Category::Banking,
            notes: None,
        };

        let foreign = repo.update(entry.id, UserId::random(), &fields).await.unwrap();
        assert!(foreign.is_none());

        let updated = repo.update(entry.id, owner, &fields).await.unwrap().unwrap();
        assert_eq!(updated.title, "bank (renamed)");
        assert_eq!(updated.secret, "rotated");
        assert_eq!(updated.username, None);
        assert!(updated.updated_at >= entry.updated_at);
    }

    #[rstest]
    #[actix_rt::test]
    async fn delete_reports_whether_a_row_went() {
        let pool = test_pool();
        let owner = seed_user(&pool).await;
        let repo = DieselPasswordEntryRepository::new(pool);
        let entry = entry_for(owner, "ephemeral", 0);
        repo.insert(&entry).await.unwrap();

        assert!(!repo.delete(entry.id, UserId::random()).await.unwrap());
        assert!(repo.delete(entry.id, owner).await.unwrap());
        assert!(!repo.delete(entry.id, owner).await.unwrap());
    }
}
