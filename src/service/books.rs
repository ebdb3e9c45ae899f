//! Book persistence operations.
//!
//! Creates and updates run their referential and uniqueness checks in
//! the same transaction as the write, so a failed check commits
//! nothing. The schema's UNIQUE and FOREIGN KEY constraints stay on as
//! a backstop for concurrent writers.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::AppError;
use crate::model::{BookPatch, BookWithParents, NewBook};

use super::BOOK_JOIN;

pub struct BookService;

impl BookService {
    /// List every book joined with its parents, in id order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<BookWithParents>, AppError> {
        let sql = format!("{BOOK_JOIN} ORDER BY b.id");
        let rows = sqlx::query_as::<_, BookWithParents>(&sql)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Fetch one book joined with its parents.
    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<BookWithParents>, AppError> {
        let sql = format!("{BOOK_JOIN} WHERE b.id = ?1");
        let row = sqlx::query_as::<_, BookWithParents>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Insert a new book after checking that both parents exist and
    /// the title is unused. Reports every failed check at once.
    pub async fn create(pool: &SqlitePool, payload: &NewBook) -> Result<BookWithParents, AppError> {
        let mut tx = pool.begin().await?;
        let mut problems = Vec::new();
        if !exists(&mut *tx, "authors", payload.author_id).await? {
            problems.push("Author does not exist".to_string());
        }
        if !exists(&mut *tx, "publishers", payload.publisher_id).await? {
            problems.push("Publisher does not exist".to_string());
        }
        if title_taken(&mut *tx, &payload.title, None).await? {
            problems.push("Title must be unique".to_string());
        }
        if !problems.is_empty() {
            return Err(AppError::Integrity(problems));
        }

        let now = Utc::now();
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO books (title, page_count, author_id, publisher_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
        )
        .bind(payload.title.as_str())
        .bind(payload.page_count)
        .bind(payload.author_id)
        .bind(payload.publisher_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        let row = joined_by_id(&mut *tx, id).await?;
        tx.commit().await?;
        tracing::debug!(book_id = id, "book created");
        Ok(row)
    }

    /// Apply a patch to one book. Referential and uniqueness checks
    /// cover the fields the patch carries; checks and the write share
    /// one transaction. Returns None when the id does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        patch: &BookPatch,
    ) -> Result<Option<BookWithParents>, AppError> {
        let mut tx = pool.begin().await?;
        if !exists(&mut *tx, "books", id).await? {
            return Ok(None);
        }
        let mut problems = Vec::new();
        if let Some(author_id) = patch.author_id {
            if !exists(&mut *tx, "authors", author_id).await? {
                problems.push("Author does not exist".to_string());
            }
        }
        if let Some(publisher_id) = patch.publisher_id {
            if !exists(&mut *tx, "publishers", publisher_id).await? {
                problems.push("Publisher does not exist".to_string());
            }
        }
        if let Some(title) = &patch.title {
            if title_taken(&mut *tx, title, Some(id)).await? {
                problems.push("Title must be unique".to_string());
            }
        }
        if !problems.is_empty() {
            return Err(AppError::Integrity(problems));
        }

        if !patch.is_empty() {
            let mut sets = Vec::new();
            if patch.title.is_some() {
                sets.push("title = ?");
            }
            if patch.page_count.is_some() {
                sets.push("page_count = ?");
            }
            if patch.author_id.is_some() {
                sets.push("author_id = ?");
            }
            if patch.publisher_id.is_some() {
                sets.push("publisher_id = ?");
            }
            sets.push("updated_at = ?");
            let sql = format!("UPDATE books SET {} WHERE id = ?", sets.join(", "));

            let mut query = sqlx::query(&sql);
            if let Some(title) = &patch.title {
                query = query.bind(title.as_str());
            }
            if let Some(page_count) = patch.page_count {
                query = query.bind(page_count);
            }
            if let Some(author_id) = patch.author_id {
                query = query.bind(author_id);
            }
            if let Some(publisher_id) = patch.publisher_id {
                query = query.bind(publisher_id);
            }
            query.bind(Utc::now()).bind(id).execute(&mut *tx).await?;
            tracing::debug!(book_id = id, "book updated");
        }
        let row = joined_by_id(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(Some(row))
    }

    /// Delete one book. Returns false when the id does not exist.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
        let rows = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();
        if rows > 0 {
            tracing::debug!(book_id = id, "book removed");
        }
        Ok(rows > 0)
    }
}

async fn exists(conn: &mut SqliteConnection, table: &str, id: i64) -> Result<bool, AppError> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?1");
    let count = sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

async fn title_taken(
    conn: &mut SqliteConnection,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let count = match exclude_id {
        Some(id) => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books WHERE title = ?1 AND id <> ?2")
                .bind(title)
                .bind(id)
                .fetch_one(conn)
                .await?
        }
        None => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books WHERE title = ?1")
                .bind(title)
                .fetch_one(conn)
                .await?
        }
    };
    Ok(count > 0)
}

async fn joined_by_id(conn: &mut SqliteConnection, id: i64) -> Result<BookWithParents, AppError> {
    let sql = format!("{BOOK_JOIN} WHERE b.id = ?1");
    let row = sqlx::query_as::<_, BookWithParents>(&sql)
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(row)
}
