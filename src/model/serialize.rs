//! Field-filtered record serialization.
//!
//! Records cross the API boundary as `serde_json::Value` maps shaped by
//! [`FieldRules`]: an optional top-level allow-list plus a deny-list of
//! dotted relation paths. Relations nest exactly one level deep as
//! scalar summaries, so mutual references (author, book, publisher)
//! can never expand unboundedly.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

use super::types::{Author, Book, BookWithParents, Publisher};

/// Per-call serialization policy.
///
/// `allows` answers for both plain fields (`"name"`) and relation
/// members (`"books.author"`); the top-level segment of a dotted path
/// must pass the allow-list for the path to pass.
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    only: Option<BTreeSet<String>>,
    exclude: BTreeSet<String>,
}

impl FieldRules {
    /// Every field and relation admitted.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict the record to the named top-level fields.
    pub fn only(fields: &[&str]) -> Self {
        FieldRules {
            only: Some(fields.iter().map(|f| (*f).to_string()).collect()),
            exclude: BTreeSet::new(),
        }
    }

    /// Deny a field or dotted relation path.
    pub fn exclude(mut self, path: &str) -> Self {
        self.exclude.insert(path.to_string());
        self
    }

    /// Re-admit a relation the defaults leave out.
    pub fn include(mut self, relation: &str) -> Self {
        self.exclude.remove(relation);
        if let Some(only) = &mut self.only {
            only.insert(relation.to_string());
        }
        self
    }

    pub fn allows(&self, path: &str) -> bool {
        if self.exclude.contains(path) {
            return false;
        }
        let top = match path.split_once('.') {
            Some((top, _)) => top,
            None => path,
        };
        match &self.only {
            Some(only) => only.contains(top),
            None => true,
        }
    }

    /// Default book shape: both parents appear as summaries without
    /// their own book lists.
    pub fn book() -> Self {
        Self::all().exclude("author.books").exclude("publisher.books")
    }

    /// Default author shape: books appear without their author
    /// back-reference; the derived publishers view stays out until
    /// explicitly included.
    pub fn author() -> Self {
        Self::all().exclude("books.author").exclude("publishers")
    }

    /// Contract publisher shape: id, name, founding year and the
    /// derived authors view only.
    pub fn publisher() -> Self {
        Self::only(&["id", "name", "founding_year", "authors"]).exclude("books.publisher")
    }
}

/// Scalar author summary used inside relations and list bodies.
pub fn author_summary(author: &Author) -> Value {
    json!({
        "id": author.id,
        "name": author.name,
        "pen_name": author.pen_name,
    })
}

/// Scalar publisher summary used inside relations and list bodies.
pub fn publisher_summary(publisher: &Publisher) -> Value {
    json!({
        "id": publisher.id,
        "name": publisher.name,
        "founding_year": publisher.founding_year,
    })
}

fn book_fields(book: &Book) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("id".into(), json!(book.id));
    fields.insert("title".into(), json!(book.title));
    fields.insert("page_count".into(), json!(book.page_count));
    fields.insert("author_id".into(), json!(book.author_id));
    fields.insert("publisher_id".into(), json!(book.publisher_id));
    fields
}

/// A book with both parents resolved, shaped by `rules`.
pub fn book_record(row: &BookWithParents, rules: &FieldRules) -> Value {
    let mut record = book_fields(&row.book)
        .into_iter()
        .filter(|(key, _)| rules.allows(key))
        .collect::<Map<String, Value>>();
    if rules.allows("author_name") {
        record.insert("author_name".into(), json!(row.author.name));
    }
    if rules.allows("publisher_name") {
        record.insert("publisher_name".into(), json!(row.publisher.name));
    }
    if rules.allows("author") {
        record.insert("author".into(), author_summary(&row.author));
    }
    if rules.allows("publisher") {
        record.insert("publisher".into(), publisher_summary(&row.publisher));
    }
    Value::Object(record)
}

fn relation_books(rows: &[BookWithParents], rules: &FieldRules) -> Value {
    let items: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut item = book_fields(&row.book);
            if rules.allows("books.author") {
                item.insert("author".into(), author_summary(&row.author));
            }
            if rules.allows("books.publisher") {
                item.insert("publisher".into(), publisher_summary(&row.publisher));
            }
            Value::Object(item)
        })
        .collect();
    Value::Array(items)
}

/// An author with its books and, when admitted, the derived distinct
/// publishers view.
pub fn author_record(author: &Author, books: &[BookWithParents], rules: &FieldRules) -> Value {
    let mut record = Map::new();
    if rules.allows("id") {
        record.insert("id".into(), json!(author.id));
    }
    if rules.allows("name") {
        record.insert("name".into(), json!(author.name));
    }
    if rules.allows("pen_name") {
        record.insert("pen_name".into(), json!(author.pen_name));
    }
    if rules.allows("books") {
        record.insert("books".into(), relation_books(books, rules));
    }
    if rules.allows("publishers") {
        let mut distinct: BTreeMap<i64, &Publisher> = BTreeMap::new();
        for row in books {
            distinct.entry(row.publisher.id).or_insert(&row.publisher);
        }
        let items: Vec<Value> = distinct.values().map(|p| publisher_summary(p)).collect();
        record.insert("publishers".into(), Value::Array(items));
    }
    Value::Object(record)
}

/// A publisher with the derived distinct authors view and, when
/// admitted, its books.
pub fn publisher_record(
    publisher: &Publisher,
    books: &[BookWithParents],
    rules: &FieldRules,
) -> Value {
    let mut record = Map::new();
    if rules.allows("id") {
        record.insert("id".into(), json!(publisher.id));
    }
    if rules.allows("name") {
        record.insert("name".into(), json!(publisher.name));
    }
    if rules.allows("founding_year") {
        record.insert("founding_year".into(), json!(publisher.founding_year));
    }
    if rules.allows("authors") {
        let mut distinct: BTreeMap<i64, &Author> = BTreeMap::new();
        for row in books {
            distinct.entry(row.author.id).or_insert(&row.author);
        }
        let items: Vec<Value> = distinct.values().map(|a| author_summary(a)).collect();
        record.insert("authors".into(), Value::Array(items));
    }
    if rules.allows("books") {
        record.insert("books".into(), relation_books(books, rules));
    }
    Value::Object(record)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn author(id: i64, name: &str, pen_name: Option<&str>) -> Author {
        Author {
            id,
            name: name.to_string(),
            pen_name: pen_name.map(|p| p.to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn publisher(id: i64, name: &str, founding_year: i64) -> Publisher {
        Publisher {
            id,
            name: name.to_string(),
            founding_year,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn book(id: i64, title: &str, author_id: i64, publisher_id: i64) -> Book {
        Book {
            id,
            title: title.to_string(),
            page_count: 100 + id,
            author_id,
            publisher_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn joined(book_row: Book, author_row: Author, publisher_row: Publisher) -> BookWithParents {
        BookWithParents {
            book: book_row,
            author: author_row,
            publisher: publisher_row,
        }
    }

    fn keys(value: &Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn book_record_resolves_parent_names_without_back_references() {
        let row = joined(
            book(1, "Dune", 1, 1),
            author(1, "Frank Herbert", None),
            publisher(1, "Chilton Books", 1930),
        );
        let record = book_record(&row, &FieldRules::book());
        assert_eq!(record["title"], "Dune");
        assert_eq!(record["author_name"], "Frank Herbert");
        assert_eq!(record["publisher_name"], "Chilton Books");
        assert!(record["author"].get("books").is_none());
        assert!(record["publisher"].get("books").is_none());
    }

    #[test]
    fn author_record_omits_book_author_back_reference() {
        let frank = author(1, "Frank Herbert", None);
        let books = vec![joined(
            book(1, "Dune", 1, 1),
            frank.clone(),
            publisher(1, "Chilton Books", 1930),
        )];

        let record = author_record(&frank, &books, &FieldRules::author());
        let items = record["books"].as_array().unwrap();
        assert!(items[0].get("author").is_none());
        assert_eq!(items[0]["publisher"]["name"], "Chilton Books");
        assert!(record.get("publishers").is_none());
    }

    #[test]
    fn included_publishers_view_is_distinct_and_ordered() {
        let frank = author(1, "Frank Herbert", None);
        let ace = publisher(2, "Ace Books", 1952);
        let chilton = publisher(1, "Chilton Books", 1930);
        let books = vec![
            joined(book(1, "Dune", 1, 2), frank.clone(), ace.clone()),
            joined(book(2, "Dune Messiah", 1, 1), frank.clone(), chilton),
            joined(book(3, "Children of Dune", 1, 2), frank.clone(), ace),
        ];

        let record = author_record(&frank, &books, &FieldRules::author().include("publishers"));
        let names: Vec<&str> = record["publishers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Chilton Books", "Ace Books"]);
    }

    #[test]
    fn publisher_record_is_restricted_to_contract_keys() {
        let chilton = publisher(1, "Chilton Books", 1930);
        let frank = author(1, "Frank Herbert", None);
        let books = vec![
            joined(book(1, "Dune", 1, 1), frank.clone(), chilton.clone()),
            joined(book(2, "Dune Messiah", 1, 1), frank, chilton.clone()),
        ];

        let record = publisher_record(&chilton, &books, &FieldRules::publisher());
        assert_eq!(keys(&record), ["authors", "founding_year", "id", "name"]);
        assert_eq!(record["authors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn publisher_books_view_keeps_authors_but_not_itself() {
        let chilton = publisher(1, "Chilton Books", 1930);
        let frank = author(1, "Frank Herbert", None);
        let books = vec![joined(book(1, "Dune", 1, 1), frank, chilton.clone())];

        let rules = FieldRules::publisher().include("books");
        let record = publisher_record(&chilton, &books, &rules);
        let items = record["books"].as_array().unwrap();
        assert_eq!(items[0]["author"]["name"], "Frank Herbert");
        assert!(items[0].get("publisher").is_none());
    }

    #[test]
    fn only_list_filters_scalar_fields() {
        let row = joined(
            book(1, "Dune", 1, 1),
            author(1, "Frank Herbert", None),
            publisher(1, "Chilton Books", 1930),
        );
        let record = book_record(&row, &FieldRules::only(&["id", "title"]));
        assert_eq!(keys(&record), ["id", "title"]);
    }
}
