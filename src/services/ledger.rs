use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::common::LedgerFilter;
use crate::errors::ServiceError;
use crate::models::{Movement, PageMeta, Summary};
use crate::services::aggregator::Aggregator;
use crate::services::envelope::unwrap_envelope;
use crate::services::movement_normalizer::normalize_all;

/// One loaded page of the movement ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPage {
    pub movements: Vec<Movement>,
    pub page: PageMeta,
    pub summary: Summary,
}

/// Turns search endpoint bodies into ledger pages.
#[derive(Clone, Debug, Default)]
pub struct LedgerService {
    aggregator: Aggregator,
}

impl LedgerService {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    /// Unwraps, normalizes, filters, sorts and aggregates one page.
    #[instrument(skip(self, body))]
    pub fn load_page(&self, body: &Value, filter: &LedgerFilter) -> Result<LedgerPage, ServiceError> {
        let active = filter.active()?;
        let unwrapped = unwrap_envelope(body, filter.page);

        let mut movements: Vec<Movement> = normalize_all(&unwrapped.items)
            .into_iter()
            .filter(|movement| active.matches(movement))
            .collect();
        sort_newest_first(&mut movements);

        let summary = self.aggregator.summarize(&movements, &unwrapped.page);
        info!(
            "Loaded ledger page {} with {} of {} movements",
            unwrapped.page.number,
            movements.len(),
            unwrapped.page.total_elements
        );

        Ok(LedgerPage {
            movements,
            page: unwrapped.page,
            summary,
        })
    }
}

/// Newest first; undated movements sink to the end, ties keep input order.
pub fn sort_newest_first(movements: &mut [Movement]) {
    movements.sort_by(|a, b| match (a.moved_at, b.moved_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
