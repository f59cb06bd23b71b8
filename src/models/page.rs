use serde::Serialize;
use serde_json::Value;

/// Pagination metadata carried alongside a list of raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_pages: u64,
    pub total_elements: u64,
    /// Zero-based page index.
    pub number: u64,
}

impl PageMeta {
    pub fn single(total_elements: u64) -> Self {
        Self {
            total_pages: 1,
            total_elements,
            number: 0,
        }
    }

    pub fn empty() -> Self {
        Self {
            total_pages: 0,
            total_elements: 0,
            number: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }
}

/// Uniform result of unwrapping any upstream response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnwrappedPage {
    pub items: Vec<Value>,
    pub page: PageMeta,
}
