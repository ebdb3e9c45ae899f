//! Persistence operations over the SQLite pool.
//!
//! Services own every SQL statement in the crate. Multi-step writes
//! (referential checks, cascading deletes) run inside a single
//! transaction so a failure commits nothing.

mod authors;
mod books;
mod publishers;

pub use authors::AuthorService;
pub use books::BookService;
pub use publishers::PublisherService;

/// Book rows joined with both parents, aliased for
/// [`BookWithParents`](crate::model::BookWithParents).
pub(crate) const BOOK_JOIN: &str = "SELECT \
    b.id AS b_id, b.title AS b_title, b.page_count AS b_page_count, \
    b.author_id AS b_author_id, b.publisher_id AS b_publisher_id, \
    b.created_at AS b_created_at, b.updated_at AS b_updated_at, \
    a.id AS a_id, a.name AS a_name, a.pen_name AS a_pen_name, \
    a.created_at AS a_created_at, a.updated_at AS a_updated_at, \
    p.id AS p_id, p.name AS p_name, p.founding_year AS p_founding_year, \
    p.created_at AS p_created_at, p.updated_at AS p_updated_at \
    FROM books b \
    JOIN authors a ON a.id = b.author_id \
    JOIN publishers p ON p.id = b.publisher_id";
