//! Publisher persistence operations.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::model::{BookWithParents, NewPublisher, Publisher, PublisherPatch};

use super::BOOK_JOIN;

pub struct PublisherService;

impl PublisherService {
    /// List every publisher in id order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Publisher>, AppError> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(publishers)
    }

    /// Fetch one publisher by id.
    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Publisher>, AppError> {
        let publisher = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(publisher)
    }

    /// Load the publisher's books joined with their authors, in book
    /// id order.
    pub async fn books(
        pool: &SqlitePool,
        publisher_id: i64,
    ) -> Result<Vec<BookWithParents>, AppError> {
        let sql = format!("{BOOK_JOIN} WHERE b.publisher_id = ?1 ORDER BY b.id");
        let rows = sqlx::query_as::<_, BookWithParents>(&sql)
            .bind(publisher_id)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Insert a new publisher and return the stored row.
    pub async fn create(pool: &SqlitePool, payload: &NewPublisher) -> Result<Publisher, AppError> {
        let now = Utc::now();
        let publisher = sqlx::query_as::<_, Publisher>(
            "INSERT INTO publishers (name, founding_year, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4) RETURNING *",
        )
        .bind(payload.name.as_str())
        .bind(payload.founding_year)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
        tracing::debug!(publisher_id = publisher.id, "publisher created");
        Ok(publisher)
    }

    /// Apply a patch to one publisher. Returns the stored row, or None
    /// when the id does not exist. An empty patch changes nothing.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        patch: &PublisherPatch,
    ) -> Result<Option<Publisher>, AppError> {
        if patch.is_empty() {
            return Self::find(pool, id).await;
        }
        let mut sets = Vec::new();
        if patch.name.is_some() {
            sets.push("name = ?");
        }
        if patch.founding_year.is_some() {
            sets.push("founding_year = ?");
        }
        sets.push("updated_at = ?");
        let sql = format!(
            "UPDATE publishers SET {} WHERE id = ? RETURNING *",
            sets.join(", ")
        );

        let mut query = sqlx::query_as::<_, Publisher>(&sql);
        if let Some(name) = &patch.name {
            query = query.bind(name.as_str());
        }
        if let Some(founding_year) = patch.founding_year {
            query = query.bind(founding_year);
        }
        let publisher = query.bind(Utc::now()).bind(id).fetch_optional(pool).await?;
        if publisher.is_some() {
            tracing::debug!(publisher_id = id, "publisher updated");
        }
        Ok(publisher)
    }

    /// Delete a publisher and every book it owns, children first, in
    /// one transaction. Returns the number of rows removed, or None
    /// when the id does not exist.
    pub async fn delete_cascade(pool: &SqlitePool, id: i64) -> Result<Option<u64>, AppError> {
        let mut tx = pool.begin().await?;
        let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM publishers WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if found == 0 {
            return Ok(None);
        }
        let books = sqlx::query("DELETE FROM books WHERE publisher_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM publishers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(publisher_id = id, books_deleted = books, "publisher removed");
        Ok(Some(books + 1))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::model::{NewAuthor, NewBook};
    use crate::service::{AuthorService, BookService};
    use crate::store::test_pool;

    use super::*;

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        let author = NewAuthor::from_json(&json!({ "name": "Frank Herbert" })).unwrap();
        let author_id = AuthorService::create(pool, &author).await.unwrap().id;
        let publisher =
            NewPublisher::from_json(&json!({ "name": "Chilton Books", "founding_year": 1930 }))
                .unwrap();
        let publisher_id = PublisherService::create(pool, &publisher).await.unwrap().id;
        (author_id, publisher_id)
    }

    #[tokio::test]
    async fn cascade_delete_removes_publisher_and_books() {
        let pool = test_pool().await;
        let (author_id, publisher_id) = seed(&pool).await;
        let other = NewPublisher::from_json(&json!({ "name": "Ace Books", "founding_year": 1952 }))
            .unwrap();
        let other_id = PublisherService::create(&pool, &other).await.unwrap().id;
        for (title, publisher) in [
            ("Dune", publisher_id),
            ("Dune Messiah", publisher_id),
            ("Children of Dune", other_id),
        ] {
            let payload = NewBook::from_json(&json!({
                "title": title,
                "page_count": 300,
                "author_id": author_id,
                "publisher_id": publisher,
            }))
            .unwrap();
            BookService::create(&pool, &payload).await.unwrap();
        }

        let removed = PublisherService::delete_cascade(&pool, publisher_id)
            .await
            .unwrap();
        assert_eq!(removed, Some(3));
        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(books, 1);
        let authors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(authors, 1);
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let pool = test_pool().await;
        let (_, publisher_id) = seed(&pool).await;

        let patch = PublisherPatch::from_json(&json!({ "founding_year": 1931 })).unwrap();
        let updated = PublisherService::update(&pool, publisher_id, &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.founding_year, 1931);
        assert_eq!(updated.name, "Chilton Books");
    }

    #[tokio::test]
    async fn update_of_missing_publisher_returns_none() {
        let pool = test_pool().await;
        let patch = PublisherPatch::from_json(&json!({ "name": "Nobody" })).unwrap();
        let updated = PublisherService::update(&pool, 42, &patch).await.unwrap();
        assert!(updated.is_none());
    }
}
