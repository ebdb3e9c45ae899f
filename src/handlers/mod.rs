//! HTTP request handlers.

use std::collections::HashMap;

use crate::error::AppError;

pub mod authors;
pub mod books;
pub mod publishers;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

/// True when the comma-separated `include` query parameter names the
/// relation.
fn include_requested(params: &HashMap<String, String>, relation: &str) -> bool {
    params
        .get("include")
        .map(|value| value.split(',').any(|part| part.trim() == relation))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("forty-two").is_err());
        assert!(parse_id("4.2").is_err());
    }

    #[test]
    fn include_requested_splits_comma_lists() {
        let mut params = HashMap::new();
        params.insert("include".to_string(), "books, publishers".to_string());
        assert!(include_requested(&params, "books"));
        assert!(include_requested(&params, "publishers"));
        assert!(!include_requested(&params, "authors"));
        assert!(!include_requested(&HashMap::new(), "books"));
    }
}
