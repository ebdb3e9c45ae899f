//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Entity kind ("Author", "Publisher", "Book") with no row for the id.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// One message per field that failed validation.
    #[error("validation failed")]
    Validation(Vec<String>),
    /// Referential or uniqueness failure detected before the write.
    #[error("integrity violation")]
    Integrity(Vec<String>),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        AppError::Validation(errors.into_iter().map(|e| e.to_string()).collect())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            AppError::Validation(errors) | AppError::Integrity(errors) => {
                (StatusCode::BAD_REQUEST, json!({ "errors": errors }))
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            AppError::Db(e) => match e.as_database_error() {
                // Constraint races that slip past the service-layer checks map to the
                // same 400 bodies those checks produce.
                Some(db) if db.is_unique_violation() => (
                    StatusCode::BAD_REQUEST,
                    json!({ "errors": ["Title must be unique"] }),
                ),
                Some(db) if db.is_foreign_key_violation() => (
                    StatusCode::BAD_REQUEST,
                    json!({ "errors": ["Referenced author or publisher does not exist"] }),
                ),
                _ => {
                    tracing::error!(error = %e, "database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "internal server error" }),
                    )
                }
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;
    use sqlx::SqlitePool;

    use crate::store::test_pool;

    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("Author").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(AppError::NotFound("Author").to_string(), "Author not found");
        assert_eq!(
            AppError::NotFound("Publisher").to_string(),
            "Publisher not found"
        );
    }

    #[test]
    fn validation_maps_to_400() {
        let response =
            AppError::Validation(vec!["Page count must be greater than 0".into()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn integrity_maps_to_400() {
        let response = AppError::Integrity(vec!["Author does not exist".into()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let response = AppError::BadRequest("invalid id 'abc'".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn response_parts(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn seed_dune(pool: &SqlitePool) {
        for sql in [
            "INSERT INTO authors (id, name, created_at, updated_at) \
             VALUES (1, 'Frank Herbert', '', '')",
            "INSERT INTO publishers (id, name, founding_year, created_at, updated_at) \
             VALUES (1, 'Chilton Books', 1930, '', '')",
            "INSERT INTO books (title, page_count, author_id, publisher_id, created_at, updated_at) \
             VALUES ('Dune', 412, 1, 1, '', '')",
        ] {
            sqlx::query(sql).execute(pool).await.unwrap();
        }
    }

    #[tokio::test]
    async fn db_unique_violation_maps_to_400() {
        let pool = test_pool().await;
        seed_dune(&pool).await;
        let err = sqlx::query(
            "INSERT INTO books (title, page_count, author_id, publisher_id, created_at, updated_at) \
             VALUES ('Dune', 200, 1, 1, '', '')",
        )
        .execute(&pool)
        .await
        .unwrap_err();

        let (status, body) = response_parts(AppError::Db(err)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["Title must be unique"] }));
    }

    #[tokio::test]
    async fn db_foreign_key_violation_maps_to_400() {
        let pool = test_pool().await;
        let err = sqlx::query(
            "INSERT INTO books (title, page_count, author_id, publisher_id, created_at, updated_at) \
             VALUES ('Dune', 412, 999, 999, '', '')",
        )
        .execute(&pool)
        .await
        .unwrap_err();

        let (status, body) = response_parts(AppError::Db(err)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": ["Referenced author or publisher does not exist"] })
        );
    }

    #[tokio::test]
    async fn unclassified_db_error_maps_to_500() {
        let (status, body) = response_parts(AppError::Db(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
    }
}
