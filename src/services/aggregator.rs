use std::sync::Arc;

use tracing::instrument;

use crate::models::{Movement, PageMeta, Summary, UNKNOWN_CENTER_LABEL};
use crate::services::center_directory::CenterDirectory;

/// Computes ledger statistics over a loaded page of movements.
#[derive(Clone, Debug)]
pub struct Aggregator {
    centers: Arc<CenterDirectory>,
    unknown_center_label: String,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Arc::new(CenterDirectory::default()), UNKNOWN_CENTER_LABEL)
    }
}

impl Aggregator {
    pub fn new(centers: Arc<CenterDirectory>, unknown_center_label: impl Into<String>) -> Self {
        Self {
            centers,
            unknown_center_label: unknown_center_label.into(),
        }
    }

    /// Aggregates a page; `total` is the server-declared element count, which
    /// need not match the number of movements on the page.
    #[instrument(skip(self, movements), fields(page_total = movements.len(), total = page.total_elements))]
    pub fn summarize(&self, movements: &[Movement], page: &PageMeta) -> Summary {
        let mut summary = self.tally(movements);
        summary.total = page.total_elements;
        summary
    }

    /// Aggregates with `total` equal to the number of movements given.
    pub fn tally(&self, movements: &[Movement]) -> Summary {
        let mut summary = Summary {
            total: movements.len() as u64,
            page_total: movements.len(),
            ..Summary::default()
        };

        for movement in movements {
            if let Some(direction) = &movement.direction {
                *summary.by_direction.entry(direction.clone()).or_insert(0) += 1;
            }
            if let Some(reason) = &movement.reason {
                *summary.by_reason.entry(reason.clone()).or_insert(0) += 1;
            }

            let label = self
                .centers
                .label_for(movement)
                .unwrap_or_else(|| self.unknown_center_label.clone());
            let tally = summary.by_center.entry(label).or_default();
            tally.total += 1;
            match &movement.direction {
                Some(direction) if direction.is_inbound() => tally.inbound += 1,
                Some(direction) if direction.is_outbound() => tally.outbound += 1,
                _ => {}
            }
        }

        summary
    }
}

/// Aggregates movements with no center directory and `total = movements.len()`.
pub fn aggregate(movements: &[Movement]) -> Summary {
    Aggregator::default().tally(movements)
}
