//! Author resource handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::model::{author_record, author_summary, AuthorPatch, FieldRules, NewAuthor};
use crate::service::AuthorService;
use crate::state::AppState;

use super::{include_requested, parse_id};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let authors = AuthorService::list(&state.pool).await?;
    let records: Vec<Value> = authors.iter().map(author_summary).collect();
    Ok(Json(Value::Array(records)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let author = AuthorService::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Author"))?;
    let books = AuthorService::books(&state.pool, id).await?;
    let mut rules = FieldRules::author();
    if include_requested(&params, "publishers") {
        rules = rules.include("publishers");
    }
    Ok(Json(author_record(&author, &books, &rules)))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let payload = NewAuthor::from_json(&body).map_err(AppError::validation)?;
    let author = AuthorService::create(&state.pool, &payload).await?;
    let record = author_record(&author, &[], &FieldRules::author());
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = AuthorPatch::from_json(&body).map_err(AppError::validation)?;
    let author = AuthorService::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::NotFound("Author"))?;
    let books = AuthorService::books(&state.pool, id).await?;
    Ok(Json(author_record(&author, &books, &FieldRules::author())))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    AuthorService::delete_cascade(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Author"))?;
    Ok(StatusCode::NO_CONTENT)
}
