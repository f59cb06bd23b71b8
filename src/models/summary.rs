use std::collections::BTreeMap;

use serde::Serialize;

use super::movement::{Direction, Reason};

/// Label used for movements that cannot be attributed to any center.
pub const UNKNOWN_CENTER_LABEL: &str = "Không rõ trung tâm";

/// Per-center rollup of movement counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CenterTally {
    pub total: usize,
    #[serde(rename = "in")]
    pub inbound: usize,
    #[serde(rename = "out")]
    pub outbound: usize,
}

/// Statistics over the currently loaded page of movements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Server-declared total across all pages.
    pub total: u64,
    /// Movements actually aggregated on this page.
    pub page_total: usize,
    pub by_direction: BTreeMap<Direction, usize>,
    pub by_reason: BTreeMap<Reason, usize>,
    pub by_center: BTreeMap<String, CenterTally>,
}

impl Summary {
    pub fn direction_count(&self, direction: &Direction) -> usize {
        self.by_direction.get(direction).copied().unwrap_or(0)
    }

    pub fn reason_count(&self, reason: &Reason) -> usize {
        self.by_reason.get(reason).copied().unwrap_or(0)
    }
}
