//! SQLite pool construction and schema bootstrap.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::AppError;

/// Open a pool for `database_url` (e.g. `sqlite://folio.db`), creating the
/// database file if missing. Foreign-key enforcement is switched on per
/// connection; SQLite leaves it off by default.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create the authors/publishers/books tables and FK indexes if absent.
/// Idempotent; called once at startup and by every test pool.
///
/// Title uniqueness and referential integrity are declared here and also
/// checked in the service layer; the service checks produce the structured
/// error bodies. Founding-year and page-count rules live in the model
/// layer only, not in CHECK constraints.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    const DDL: &[&str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            pen_name TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS publishers (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            founding_year INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            page_count INTEGER NOT NULL,
            author_id INTEGER NOT NULL REFERENCES authors (id),
            publisher_id INTEGER NOT NULL REFERENCES publishers (id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_books_author_id ON books (author_id)",
        "CREATE INDEX IF NOT EXISTS idx_books_publisher_id ON books (publisher_id)",
    ];

    for ddl in DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::debug!("schema ensured");
    Ok(())
}

/// In-memory pool with the schema applied and foreign keys enforced,
/// for unit tests. One connection so every handle sees the same
/// database.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("in-memory options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory pool");
    ensure_schema(&pool).await.expect("schema bootstrap");
    pool
}
