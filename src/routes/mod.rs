//! Router construction.

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod api;
pub mod common;

pub use api::api_routes;
pub use common::common_routes;

/// Request bodies larger than this are rejected before any handler
/// runs.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The full application router: common routes merged with the
/// resource routes, behind the body size limit.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(api_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
