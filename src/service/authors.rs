//! Author persistence operations.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::model::{Author, AuthorPatch, BookWithParents, NewAuthor};

use super::BOOK_JOIN;

pub struct AuthorService;

impl AuthorService {
    /// List every author in id order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Author>, AppError> {
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(authors)
    }

    /// Fetch one author by id.
    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Author>, AppError> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(author)
    }

    /// Load the author's books joined with their publishers, in book
    /// id order.
    pub async fn books(pool: &SqlitePool, author_id: i64) -> Result<Vec<BookWithParents>, AppError> {
        let sql = format!("{BOOK_JOIN} WHERE b.author_id = ?1 ORDER BY b.id");
        let rows = sqlx::query_as::<_, BookWithParents>(&sql)
            .bind(author_id)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Insert a new author and return the stored row.
    pub async fn create(pool: &SqlitePool, payload: &NewAuthor) -> Result<Author, AppError> {
        let now = Utc::now();
        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, pen_name, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4) RETURNING *",
        )
        .bind(payload.name.as_str())
        .bind(payload.pen_name.as_deref())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
        tracing::debug!(author_id = author.id, "author created");
        Ok(author)
    }

    /// Apply a patch to one author. Returns the stored row, or None
    /// when the id does not exist. An empty patch changes nothing.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        patch: &AuthorPatch,
    ) -> Result<Option<Author>, AppError> {
        if patch.is_empty() {
            return Self::find(pool, id).await;
        }
        let mut sets = Vec::new();
        if patch.name.is_some() {
            sets.push("name = ?");
        }
        if patch.pen_name.is_some() {
            sets.push("pen_name = ?");
        }
        sets.push("updated_at = ?");
        let sql = format!(
            "UPDATE authors SET {} WHERE id = ? RETURNING *",
            sets.join(", ")
        );

        let mut query = sqlx::query_as::<_, Author>(&sql);
        if let Some(name) = &patch.name {
            query = query.bind(name.as_str());
        }
        if let Some(pen_name) = &patch.pen_name {
            query = query.bind(pen_name.as_deref());
        }
        let author = query.bind(Utc::now()).bind(id).fetch_optional(pool).await?;
        if author.is_some() {
            tracing::debug!(author_id = id, "author updated");
        }
        Ok(author)
    }

    /// Delete an author and every book it owns, children first, in one
    /// transaction. Returns the number of rows removed, or None when
    /// the id does not exist.
    pub async fn delete_cascade(pool: &SqlitePool, id: i64) -> Result<Option<u64>, AppError> {
        let mut tx = pool.begin().await?;
        let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM authors WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if found == 0 {
            return Ok(None);
        }
        let books = sqlx::query("DELETE FROM books WHERE author_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM authors WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(author_id = id, books_deleted = books, "author removed");
        Ok(Some(books + 1))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::model::{NewBook, NewPublisher};
    use crate::service::{BookService, PublisherService};
    use crate::store::test_pool;

    use super::*;

    async fn seed_author(pool: &SqlitePool, name: &str) -> Author {
        let payload = NewAuthor::from_json(&json!({ "name": name })).unwrap();
        AuthorService::create(pool, &payload).await.unwrap()
    }

    async fn seed_publisher(pool: &SqlitePool, name: &str) -> i64 {
        let payload =
            NewPublisher::from_json(&json!({ "name": name, "founding_year": 1930 })).unwrap();
        PublisherService::create(pool, &payload).await.unwrap().id
    }

    async fn seed_book(pool: &SqlitePool, title: &str, author_id: i64, publisher_id: i64) {
        let payload = NewBook::from_json(&json!({
            "title": title,
            "page_count": 200,
            "author_id": author_id,
            "publisher_id": publisher_id,
        }))
        .unwrap();
        BookService::create(pool, &payload).await.unwrap();
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn cascade_delete_removes_author_and_books() {
        let pool = test_pool().await;
        let author = seed_author(&pool, "Frank Herbert").await;
        let other = seed_author(&pool, "Ursula K. Le Guin").await;
        let publisher = seed_publisher(&pool, "Chilton Books").await;
        seed_book(&pool, "Dune", author.id, publisher).await;
        seed_book(&pool, "Dune Messiah", author.id, publisher).await;
        seed_book(&pool, "The Dispossessed", other.id, publisher).await;

        let removed = AuthorService::delete_cascade(&pool, author.id)
            .await
            .unwrap();
        assert_eq!(removed, Some(3));
        assert_eq!(count(&pool, "authors").await, 1);
        assert_eq!(count(&pool, "books").await, 1);
        assert!(AuthorService::find(&pool, author.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cascade_delete_of_missing_author_touches_nothing() {
        let pool = test_pool().await;
        seed_author(&pool, "Frank Herbert").await;

        let removed = AuthorService::delete_cascade(&pool, 999).await.unwrap();
        assert_eq!(removed, None);
        assert_eq!(count(&pool, "authors").await, 1);
    }

    #[tokio::test]
    async fn patch_clears_pen_name_when_sent_as_null() {
        let pool = test_pool().await;
        let payload = NewAuthor::from_json(&json!({
            "name": "Alice Bradley Sheldon",
            "pen_name": "James Tiptree Jr.",
        }))
        .unwrap();
        let author = AuthorService::create(&pool, &payload).await.unwrap();

        let patch = AuthorPatch::from_json(&json!({ "pen_name": null })).unwrap();
        let updated = AuthorService::update(&pool, author.id, &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.pen_name, None);
        assert_eq!(updated.name, "Alice Bradley Sheldon");
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op() {
        let pool = test_pool().await;
        let author = seed_author(&pool, "Frank Herbert").await;

        let patch = AuthorPatch::from_json(&json!({})).unwrap();
        let updated = AuthorService::update(&pool, author.id, &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.updated_at, author.updated_at);
    }
}
