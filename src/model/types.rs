//! Row types and validated write payloads.
//!
//! Rows mirror the tables one to one. Payloads are built from raw JSON
//! through [`from_json`](NewBook::from_json) constructors that run every
//! field rule and hand back the full list of failures, so a caller never
//! holds a payload that would violate a column constraint.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::validation::{
    collect, integer_value, required_integer, required_string, string_value,
    validate_founding_year, validate_page_count, ValidationError,
};

#[derive(Clone, Debug, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub pen_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, FromRow)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub founding_year: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub page_count: i64,
    pub author_id: i64,
    pub publisher_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A book joined with both of its parent rows.
///
/// Loaded from queries that alias book columns as `b_*`, author columns
/// as `a_*` and publisher columns as `p_*`.
#[derive(Clone, Debug)]
pub struct BookWithParents {
    pub book: Book,
    pub author: Author,
    pub publisher: Publisher,
}

impl FromRow<'_, SqliteRow> for BookWithParents {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(BookWithParents {
            book: Book {
                id: row.try_get("b_id")?,
                title: row.try_get("b_title")?,
                page_count: row.try_get("b_page_count")?,
                author_id: row.try_get("b_author_id")?,
                publisher_id: row.try_get("b_publisher_id")?,
                created_at: row.try_get("b_created_at")?,
                updated_at: row.try_get("b_updated_at")?,
            },
            author: Author {
                id: row.try_get("a_id")?,
                name: row.try_get("a_name")?,
                pen_name: row.try_get("a_pen_name")?,
                created_at: row.try_get("a_created_at")?,
                updated_at: row.try_get("a_updated_at")?,
            },
            publisher: Publisher {
                id: row.try_get("p_id")?,
                name: row.try_get("p_name")?,
                founding_year: row.try_get("p_founding_year")?,
                created_at: row.try_get("p_created_at")?,
                updated_at: row.try_get("p_updated_at")?,
            },
        })
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, Vec<ValidationError>> {
    body.as_object()
        .ok_or_else(|| vec![ValidationError::new("Request body must be a JSON object")])
}

#[derive(Clone, Debug)]
pub struct NewAuthor {
    pub name: String,
    pub pen_name: Option<String>,
}

impl NewAuthor {
    pub fn from_json(body: &Value) -> Result<Self, Vec<ValidationError>> {
        let body = as_object(body)?;
        let mut errors = Vec::new();
        let name = required_string(body, "name", "Name", &mut errors);
        let pen_name = match body.get("pen_name") {
            None | Some(Value::Null) => None,
            Some(v) => string_value(v, "Pen name", &mut errors),
        };
        match name {
            Some(name) if errors.is_empty() => Ok(NewAuthor { name, pen_name }),
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewPublisher {
    pub name: String,
    pub founding_year: i64,
}

impl NewPublisher {
    pub fn from_json(body: &Value) -> Result<Self, Vec<ValidationError>> {
        let body = as_object(body)?;
        let mut errors = Vec::new();
        let name = required_string(body, "name", "Name", &mut errors);
        let founding_year = required_integer(body, "founding_year", "Founding year", &mut errors)
            .and_then(|year| collect(validate_founding_year(year), &mut errors));
        match (name, founding_year) {
            (Some(name), Some(founding_year)) if errors.is_empty() => Ok(NewPublisher {
                name,
                founding_year,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewBook {
    pub title: String,
    pub page_count: i64,
    pub author_id: i64,
    pub publisher_id: i64,
}

impl NewBook {
    pub fn from_json(body: &Value) -> Result<Self, Vec<ValidationError>> {
        let body = as_object(body)?;
        let mut errors = Vec::new();
        let title = required_string(body, "title", "Title", &mut errors);
        let page_count = required_integer(body, "page_count", "Page count", &mut errors)
            .and_then(|count| collect(validate_page_count(count), &mut errors));
        let author_id = required_integer(body, "author_id", "Author id", &mut errors);
        let publisher_id = required_integer(body, "publisher_id", "Publisher id", &mut errors);
        match (title, page_count, author_id, publisher_id) {
            (Some(title), Some(page_count), Some(author_id), Some(publisher_id))
                if errors.is_empty() =>
            {
                Ok(NewBook {
                    title,
                    page_count,
                    author_id,
                    publisher_id,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Partial author update. Absent keys leave the column untouched.
///
/// `pen_name` distinguishes "not sent" (`None`) from "sent as null"
/// (`Some(None)`), which clears the stored pen name.
#[derive(Clone, Debug, Default)]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub pen_name: Option<Option<String>>,
}

impl AuthorPatch {
    pub fn from_json(body: &Value) -> Result<Self, Vec<ValidationError>> {
        let body = as_object(body)?;
        let mut errors = Vec::new();
        let name = match body.get("name") {
            None => None,
            Some(Value::Null) => {
                errors.push(ValidationError::new("Name is required"));
                None
            }
            Some(v) => string_value(v, "Name", &mut errors),
        };
        let pen_name = match body.get("pen_name") {
            None => None,
            Some(Value::Null) => Some(None),
            Some(v) => string_value(v, "Pen name", &mut errors).map(Some),
        };
        if errors.is_empty() {
            Ok(AuthorPatch { name, pen_name })
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.pen_name.is_none()
    }
}

/// Partial publisher update. Absent keys leave the column untouched.
#[derive(Clone, Debug, Default)]
pub struct PublisherPatch {
    pub name: Option<String>,
    pub founding_year: Option<i64>,
}

impl PublisherPatch {
    pub fn from_json(body: &Value) -> Result<Self, Vec<ValidationError>> {
        let body = as_object(body)?;
        let mut errors = Vec::new();
        let name = match body.get("name") {
            None => None,
            Some(Value::Null) => {
                errors.push(ValidationError::new("Name is required"));
                None
            }
            Some(v) => string_value(v, "Name", &mut errors),
        };
        let founding_year = match body.get("founding_year") {
            None => None,
            Some(Value::Null) => {
                errors.push(ValidationError::new("Founding year is required"));
                None
            }
            Some(v) => integer_value(v, "Founding year", &mut errors)
                .and_then(|year| collect(validate_founding_year(year), &mut errors)),
        };
        if errors.is_empty() {
            Ok(PublisherPatch {
                name,
                founding_year,
            })
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.founding_year.is_none()
    }
}

/// Partial book update. Absent keys leave the column untouched.
#[derive(Clone, Debug, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub page_count: Option<i64>,
    pub author_id: Option<i64>,
    pub publisher_id: Option<i64>,
}

impl BookPatch {
    pub fn from_json(body: &Value) -> Result<Self, Vec<ValidationError>> {
        let body = as_object(body)?;
        let mut errors = Vec::new();
        let title = match body.get("title") {
            None => None,
            Some(Value::Null) => {
                errors.push(ValidationError::new("Title is required"));
                None
            }
            Some(v) => string_value(v, "Title", &mut errors),
        };
        let page_count = match body.get("page_count") {
            None => None,
            Some(Value::Null) => {
                errors.push(ValidationError::new("Page count is required"));
                None
            }
            Some(v) => integer_value(v, "Page count", &mut errors)
                .and_then(|count| collect(validate_page_count(count), &mut errors)),
        };
        let author_id = patch_fk(body, "author_id", "Author id", &mut errors);
        let publisher_id = patch_fk(body, "publisher_id", "Publisher id", &mut errors);
        if errors.is_empty() {
            Ok(BookPatch {
                title,
                page_count,
                author_id,
                publisher_id,
            })
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.page_count.is_none()
            && self.author_id.is_none()
            && self.publisher_id.is_none()
    }
}

fn patch_fk(
    body: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<i64> {
    match body.get(key) {
        None => None,
        Some(Value::Null) => {
            errors.push(ValidationError::new(format!("{} is required", label)));
            None
        }
        Some(v) => integer_value(v, label, errors),
    }
}
