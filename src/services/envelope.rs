//! Response-envelope detection.
//!
//! Backend endpoints answer with a bare array, a Spring-style page object
//! (`content`/`totalPages`/`totalElements`/`number`), a single entity, or
//! nothing. [`Envelope::detect`] classifies the body once so everything
//! downstream works on an [`UnwrappedPage`].

use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{PageMeta, UnwrappedPage};

/// The closed set of body shapes an endpoint may return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope<'a> {
    Collection(&'a [Value]),
    Page {
        content: &'a [Value],
        body: &'a Map<String, Value>,
    },
    Single(&'a Value),
    Empty,
}

impl<'a> Envelope<'a> {
    /// First match wins: array, page object, any other value, null.
    pub fn detect(body: &'a Value) -> Self {
        match body {
            Value::Null => Envelope::Empty,
            Value::Array(items) => Envelope::Collection(items),
            Value::Object(map) => match map.get("content") {
                Some(Value::Array(content)) => Envelope::Page { content, body: map },
                _ => Envelope::Single(body),
            },
            // Malformed bodies degrade to a single record.
            other => Envelope::Single(other),
        }
    }

    pub fn into_page(self, requested_page: u64) -> UnwrappedPage {
        match self {
            Envelope::Collection(items) => UnwrappedPage {
                items: items.to_vec(),
                page: PageMeta::single(items.len() as u64),
            },
            Envelope::Page { content, body } => {
                let item_count = content.len() as u64;
                UnwrappedPage {
                    items: content.to_vec(),
                    page: PageMeta {
                        total_pages: coerce_count(body, "totalPages", 1, 0),
                        total_elements: coerce_count(body, "totalElements", item_count, item_count),
                        number: coerce_count(body, "number", requested_page, requested_page),
                    },
                }
            }
            Envelope::Single(record) => UnwrappedPage {
                items: vec![record.clone()],
                page: PageMeta::single(1),
            },
            Envelope::Empty => UnwrappedPage {
                items: Vec::new(),
                page: PageMeta::empty(),
            },
        }
    }
}

/// Unwraps any response body into `{ items, page }`.
pub fn unwrap_envelope(body: &Value, requested_page: u64) -> UnwrappedPage {
    Envelope::detect(body).into_page(requested_page)
}

/// Unwraps an optional body; `None` behaves like `null`.
pub fn unwrap_optional(body: Option<&Value>, requested_page: u64) -> UnwrappedPage {
    match body {
        Some(body) => unwrap_envelope(body, requested_page),
        None => Envelope::Empty.into_page(requested_page),
    }
}

/// Reads a non-negative integer page field. `null`/absent yields `absent`;
/// anything that is not a whole non-negative number yields `malformed`.
fn coerce_count(body: &Map<String, Value>, key: &str, absent: u64, malformed: u64) -> u64 {
    let value = match body.get(key) {
        None | Some(Value::Null) => return absent,
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        warn!("Malformed page metadata {}={}, coercing to {}", key, value, malformed);
        malformed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_is_a_single_implicit_page() {
        let body = json!([{"id": 1}, {"id": 2}]);
        let unwrapped = unwrap_envelope(&body, 4);
        assert_eq!(unwrapped.items.len(), 2);
        assert_eq!(unwrapped.page, PageMeta::single(2));
    }

    #[test]
    fn page_object_carries_metadata_through() {
        let body = json!({
            "content": [{"id": 1}, {"id": 2}, {"id": 3}],
            "totalPages": 2,
            "totalElements": 25,
            "number": 1
        });
        let unwrapped = unwrap_envelope(&body, 0);
        assert_eq!(unwrapped.items.len(), 3);
        assert_eq!(unwrapped.page.number, 1);
        assert_eq!(unwrapped.page.total_elements, 25);
        assert_eq!(unwrapped.page.total_pages, 2);
    }

    #[test]
    fn page_object_defaults_missing_metadata() {
        let body = json!({"content": [{"id": 1}]});
        let unwrapped = unwrap_envelope(&body, 3);
        assert_eq!(
            unwrapped.page,
            PageMeta {
                total_pages: 1,
                total_elements: 1,
                number: 3
            }
        );
    }

    #[test]
    fn malformed_page_metadata_is_coerced() {
        let body = json!({
            "content": [{"id": 1}, {"id": 2}],
            "totalPages": "many",
            "totalElements": 2.5,
            "number": "1"
        });
        let unwrapped = unwrap_envelope(&body, 0);
        assert_eq!(unwrapped.page.total_pages, 0);
        assert_eq!(unwrapped.page.total_elements, 2);
        assert_eq!(unwrapped.page.number, 1);
    }

    #[test]
    fn object_without_content_array_is_a_single_record() {
        let body = json!({"id": 9, "content": "not a list"});
        let unwrapped = unwrap_envelope(&body, 0);
        assert_eq!(unwrapped.items, vec![body.clone()]);
        assert_eq!(unwrapped.page, PageMeta::single(1));
    }

    #[test]
    fn null_and_missing_bodies_are_empty() {
        assert_eq!(unwrap_envelope(&Value::Null, 2).page, PageMeta::empty());
        let unwrapped = unwrap_optional(None, 0);
        assert!(unwrapped.items.is_empty());
        assert_eq!(unwrapped.page.total_pages, 0);
    }

    #[test]
    fn detect_classifies_each_shape() {
        assert!(matches!(Envelope::detect(&json!([])), Envelope::Collection(_)));
        assert!(matches!(
            Envelope::detect(&json!({"content": []})),
            Envelope::Page { .. }
        ));
        assert!(matches!(Envelope::detect(&json!({"id": 1})), Envelope::Single(_)));
        assert!(matches!(Envelope::detect(&json!("text")), Envelope::Single(_)));
        assert_eq!(Envelope::detect(&Value::Null), Envelope::Empty);
    }
}
