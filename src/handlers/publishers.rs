//! Publisher resource handlers.
//!
//! Single-publisher responses use the contract shape: id, name,
//! founding year and the derived authors view, plus books on request.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::model::{publisher_record, publisher_summary, FieldRules, NewPublisher, PublisherPatch};
use crate::service::PublisherService;
use crate::state::AppState;

use super::{include_requested, parse_id};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let publishers = PublisherService::list(&state.pool).await?;
    let records: Vec<Value> = publishers.iter().map(publisher_summary).collect();
    Ok(Json(Value::Array(records)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let publisher = PublisherService::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Publisher"))?;
    let books = PublisherService::books(&state.pool, id).await?;
    let mut rules = FieldRules::publisher();
    if include_requested(&params, "books") {
        rules = rules.include("books");
    }
    Ok(Json(publisher_record(&publisher, &books, &rules)))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let payload = NewPublisher::from_json(&body).map_err(AppError::validation)?;
    let publisher = PublisherService::create(&state.pool, &payload).await?;
    let record = publisher_record(&publisher, &[], &FieldRules::publisher());
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = PublisherPatch::from_json(&body).map_err(AppError::validation)?;
    let publisher = PublisherService::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::NotFound("Publisher"))?;
    let books = PublisherService::books(&state.pool, id).await?;
    Ok(Json(publisher_record(
        &publisher,
        &books,
        &FieldRules::publisher(),
    )))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    PublisherService::delete_cascade(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Publisher"))?;
    Ok(StatusCode::NO_CONTENT)
}
