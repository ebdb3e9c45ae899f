//! Resource routes for authors, publishers and books.
//!
//! Paths take the id as a string so handlers can reject non-integer
//! ids with a structured 400 body.

use axum::routing::get;
use axum::Router;

use crate::handlers::{authors, books, publishers};
use crate::state::AppState;

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/authors", get(authors::list).post(authors::create))
        .route(
            "/authors/:id",
            get(authors::read)
                .patch(authors::update)
                .delete(authors::delete),
        )
        .route(
            "/publishers",
            get(publishers::list).post(publishers::create),
        )
        .route(
            "/publishers/:id",
            get(publishers::read)
                .patch(publishers::update)
                .delete(publishers::delete),
        )
        .route("/books", get(books::list).post(books::create))
        .route(
            "/books/:id",
            get(books::read).patch(books::update).delete(books::delete),
        )
        .with_state(state)
}
