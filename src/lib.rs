//! Folio: a relational library catalog API over SQLite.
//!
//! Three related entities (authors, publishers, books) exposed over
//! HTTP with CRUD endpoints, cascading deletes, field validation and
//! rule-driven record serialization.

pub mod error;
pub mod model;
pub mod state;
pub mod store;
pub mod extractors;
pub mod service;
pub mod handlers;
pub mod routes;

pub use error::AppError;
pub use routes::{api_routes, app, common_routes};
pub use service::{AuthorService, BookService, PublisherService};
pub use state::AppState;
pub use store::{connect, ensure_schema};
