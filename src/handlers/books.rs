//! Book resource handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::model::{book_record, BookPatch, FieldRules, NewBook};
use crate::service::BookService;
use crate::state::AppState;

use super::parse_id;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = BookService::list(&state.pool).await?;
    let rules = FieldRules::book();
    let records: Vec<Value> = rows.iter().map(|row| book_record(row, &rules)).collect();
    Ok(Json(Value::Array(records)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let row = BookService::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Book"))?;
    Ok(Json(book_record(&row, &FieldRules::book())))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let payload = NewBook::from_json(&body).map_err(AppError::validation)?;
    let row = BookService::create(&state.pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(book_record(&row, &FieldRules::book())),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = BookPatch::from_json(&body).map_err(AppError::validation)?;
    let row = BookService::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::NotFound("Book"))?;
    Ok(Json(book_record(&row, &FieldRules::book())))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    if !BookService::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Book"));
    }
    Ok(StatusCode::NO_CONTENT)
}
