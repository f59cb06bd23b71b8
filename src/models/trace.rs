use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::lot::Lot;
use super::movement::{Direction, Reason};

/// One row of a part's movement history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementProjection {
    pub movement_id: String,
    pub date: Option<DateTime<Utc>>,
    pub direction: Option<Direction>,
    pub reason: Option<Reason>,
    pub center_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub note: Option<String>,
    pub appointment_note: Option<String>,
}

/// Provenance and movement history of one physical part for a VIN query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartTraceRecord {
    pub part_key: String,
    pub part_id: Option<String>,
    pub part_no: Option<String>,
    pub part_name: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub serial_no: Option<String>,
    pub batch_no: Option<String>,
    pub part_lots: Vec<Lot>,
    pub movements: Vec<MovementProjection>,
}

/// Full traceability report for a single vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VinTraceReport {
    pub vin: String,
    pub parts: Vec<PartTraceRecord>,
    pub movement_count: usize,
    /// Movements with neither a part id nor a part number.
    pub unattributed_count: usize,
}

impl VinTraceReport {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
