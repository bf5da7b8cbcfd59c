//! Diesel-backed document metadata repository.

use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use super::models::{DocumentRow, NewDocumentRow};
use super::pool::DbPool;
use super::schema::documents::dsl;
use crate::domain::ports::{DocumentRepository, RepositoryError};
use crate::domain::{Document, UserId};

/// SQLite adapter for [`DocumentRepository`].
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    /// Build the adapter over a shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn list(&self, owner: UserId) -> Result<Vec<Document>, RepositoryError> {
        let owner = owner.to_string();
        let rows = self
            .pool
            .run(move |conn| {
                dsl::documents
                    .filter(dsl::owner_id.eq(owner))
                    .order(dsl::created_at.desc())
                    .select(DocumentRow::as_select())
                    .load(conn)
            })
            .await?;
        rows.into_iter().map(DocumentRow::into_domain).collect()
    }

    async fn find(&self, id: Uuid, owner: UserId) -> Result<Option<Document>, RepositoryError> {
        let id = id.to_string();
        let owner = owner.to_string();
        let row = self
            .pool
            .run(move |conn| {
                dsl::documents
                    .filter(dsl::id.eq(id))
                    .filter(dsl::owner_id.eq(owner))
                    .select(DocumentRow::as_select())
                    .first(conn)
                    .optional()
            })
            .await?;
        row.map(DocumentRow::into_domain).transpose()
    }

    async fn insert(&self, document: &Document) -> Result<(), RepositoryError> {
        let document = document.clone();
        self.pool
            .run(move |conn| {
                diesel::insert_into(dsl::documents)
                    .values(NewDocumentRow::from_domain(&document))
                    .execute(conn)
                    .map(|_| ())
            })
            .await
    }

    async fn delete(&self, id: Uuid, owner: UserId) -> Result<Option<Document>, RepositoryError> {
        let doc_id = id.to_string();
        let owner_id = owner.to_string();
        let removed = self
            .pool
            .run(move |conn| {
                let existing = dsl::documents
                    .filter(dsl::id.eq(&doc_id))
                    .filter(dsl::owner_id.eq(&owner_id))
                    .select(DocumentRow::as_select())
                    .first(conn)
                    .optional()?;
                let Some(row) = existing else {
                    return Ok(None);
                };
                diesel::delete(dsl::documents.filter(dsl::id.eq(&doc_id))).execute(conn)?;
                Ok(Some(row))
            })
            .await?;
        removed.map(DocumentRow::into_domain).transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::Locator;
    use crate::test_support::{seed_user, test_pool};

    fn document_for(owner: UserId, name: &str, offset_secs: i64) -> Document {
        Document {
            id: Uuid::new_v4(),
            owner_id: owner,
            stored_name: format!("{offset_secs}-{name}"),
            original_name: name.to_owned(),
            locator: Locator::new(format!("uploads/documents/{offset_secs}-{name}")),
            content_type: "application/pdf".to_owned(),
            size_bytes: 1024,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn lists_newest_first_for_owner_only() {
        let pool = test_pool();
        let owner = seed_user(&pool).await;
        let other = seed_user(&pool).await;
        let repo = DieselDocumentRepository::new(pool);

        repo.insert(&document_for(owner, "tax.pdf", 0)).await.unwrap();
        repo.insert(&document_for(owner, "will.pdf", 60)).await.unwrap();
        repo.insert(&document_for(other, "other.pdf", 120))
            .await
            .unwrap();

        let listed = repo.list(owner).await.unwrap();
        let names: Vec<_> = listed.iter().map(|d| d.original_name.as_str()).collect();
        assert_eq!(names, vec!["will.pdf", "tax.pdf"]);
    }

    #[rstest]
    #[actix_rt::test]
    async fn delete_returns_the_removed_record() {
        let pool = test_pool();
        let owner = seed_user(&pool).await;
        let repo = DieselDocumentRepository::new(pool);
        let document = document_for(owner, "tax.pdf", 0);
        repo.insert(&document).await.unwrap();

        assert!(repo.delete(document.id, UserId::random()).await.unwrap().is_none());

        let removed = repo.delete(document.id, owner).await.unwrap().unwrap();
        assert_eq!(removed.locator, document.locator);
        assert!(repo.find(document.id, owner).await.unwrap().is_none());
    }
}
