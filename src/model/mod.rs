//! Entity rows, validated write payloads and record serialization.

mod serialize;
mod types;
pub mod validation;

pub use serialize::{
    author_record, author_summary, book_record, publisher_record, publisher_summary, FieldRules,
};
pub use types::{
    Author, AuthorPatch, Book, BookPatch, BookWithParents, NewAuthor, NewBook, NewPublisher,
    Publisher, PublisherPatch,
};
pub use validation::{validate_founding_year, validate_page_count, ValidationError};
