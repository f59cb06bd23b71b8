use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::common::VinQuery;
use crate::errors::ServiceError;
use crate::models::{Movement, MovementProjection, PartTraceRecord, VinTraceReport};
use crate::services::center_directory::CenterDirectory;
use crate::services::envelope::unwrap_envelope;
use crate::services::lot_resolver::resolve_lots;
use crate::services::movement_normalizer::normalize_all;

/// Insertion-ordered part groups keyed by part key.
#[derive(Debug, Default)]
struct PartGroups {
    positions: HashMap<String, usize>,
    records: Vec<PartTraceRecord>,
}

impl PartGroups {
    fn get_or_insert_with(
        &mut self,
        key: &str,
        seed: impl FnOnce() -> PartTraceRecord,
    ) -> &mut PartTraceRecord {
        let index = match self.positions.get(key) {
            Some(&index) => index,
            None => {
                self.records.push(seed());
                let index = self.records.len() - 1;
                self.positions.insert(key.to_string(), index);
                index
            }
        };
        &mut self.records[index]
    }

    fn into_records(self) -> Vec<PartTraceRecord> {
        self.records
    }
}

/// Builds VIN-scoped traceability reports.
#[derive(Clone, Debug, Default)]
pub struct TraceabilityService {
    centers: Arc<CenterDirectory>,
}

impl TraceabilityService {
    pub fn new(centers: Arc<CenterDirectory>) -> Self {
        Self { centers }
    }

    /// Groups movements by part key, in first-encounter order.
    ///
    /// Movements without a part id or part number cannot be attributed to a
    /// part and are left out; every other movement lands in exactly one record.
    pub fn group_by_vin(&self, movements: &[Movement]) -> Vec<PartTraceRecord> {
        let mut groups = PartGroups::default();

        for movement in movements {
            let Some(part_key) = movement.part_key() else {
                debug!("Movement {} has no part key, skipping", movement.id);
                continue;
            };

            let lots = resolve_lots(movement);
            let record = groups.get_or_insert_with(part_key, || {
                let first_lot = lots.first();
                PartTraceRecord {
                    part_key: part_key.to_string(),
                    part_id: movement.part_id.clone(),
                    part_no: movement.part_no.clone(),
                    part_name: movement.part_name.clone(),
                    production_date: first_lot.and_then(|lot| lot.mfg_date),
                    serial_no: first_lot.and_then(|lot| lot.serial_no.clone()),
                    batch_no: first_lot.and_then(|lot| lot.batch_no.clone()),
                    part_lots: Vec::new(),
                    movements: Vec::new(),
                }
            });

            record.movements.push(self.project(movement));
            record.part_lots.extend(lots);
        }

        groups.into_records()
    }

    /// Validates the VIN, unwraps the trace endpoint body and groups its movements.
    #[instrument(skip(self, body), fields(vin = %query.vin))]
    pub fn trace(&self, query: &VinQuery, body: &Value) -> Result<VinTraceReport, ServiceError> {
        let vin = query.canonical()?.to_string();
        let unwrapped = unwrap_envelope(body, 0);
        let movements = normalize_all(&unwrapped.items);
        let parts = self.group_by_vin(&movements);

        let attributed: usize = parts.iter().map(|part| part.movements.len()).sum();
        let report = VinTraceReport {
            vin,
            movement_count: movements.len(),
            unattributed_count: movements.len() - attributed,
            parts,
        };

        info!(
            "Traced {} movements into {} parts ({} unattributed)",
            report.movement_count,
            report.parts.len(),
            report.unattributed_count
        );
        Ok(report)
    }

    fn project(&self, movement: &Movement) -> MovementProjection {
        MovementProjection {
            movement_id: movement.id.clone(),
            date: movement.moved_at,
            direction: movement.direction.clone(),
            reason: movement.reason.clone(),
            center_name: self.centers.display_name_for(movement),
            quantity: movement.total_quantity,
            note: movement.note.clone(),
            appointment_note: movement.appointment_note.clone(),
        }
    }
}

/// Groups movements by part key without a center directory.
pub fn group_by_vin(movements: &[Movement]) -> Vec<PartTraceRecord> {
    TraceabilityService::default().group_by_vin(movements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use crate::services::movement_normalizer::{normalize, normalize_all};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn same_part_id_with_different_part_numbers_is_one_record() {
        let movements = normalize_all(&[
            json!({"partId": "P1", "partNo": "A", "direction": "IN"}),
            json!({"partId": "P1", "partNo": "B", "direction": "OUT"}),
        ]);
        let records = group_by_vin(&movements);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].part_key, "P1");
        assert_eq!(records[0].part_no.as_deref(), Some("A"));
        assert_eq!(records[0].movements.len(), 2);
        assert_eq!(records[0].movements[1].direction, Some(Direction::Out));
    }

    #[test]
    fn movements_without_part_id_group_by_part_number() {
        let movements = normalize_all(&[
            json!({"partNo": "A"}),
            json!({"partNo": "B"}),
            json!({"partNo": "A"}),
        ]);
        let records = group_by_vin(&movements);
        let keys: Vec<&str> = records.iter().map(|r| r.part_key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(records[0].movements.len(), 2);
    }

    #[test]
    fn part_keys_compare_by_value() {
        let movements = normalize_all(&[json!({"partId": "A"}), json!({"partNo": "A"})]);
        // both keys read "A", so they share a group
        assert_eq!(group_by_vin(&movements).len(), 1);

        let movements = normalize_all(&[json!({"partId": "P9", "partNo": "A"}), json!({"partNo": "A"})]);
        assert_eq!(group_by_vin(&movements).len(), 2);
    }

    #[test]
    fn unattributable_movements_are_excluded() {
        let movements = normalize_all(&[
            json!({"partNo": "A"}),
            json!({"direction": "IN", "quantity": 3}),
        ]);
        let records = group_by_vin(&movements);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].movements.len(), 1);
    }

    #[test]
    fn provenance_comes_from_first_lot_of_first_movement() {
        let movements = normalize_all(&[
            json!({
                "partId": "P1",
                "partLots": [
                    {"serialNo": "S-1", "batchNo": "B-1", "mfgDate": "2023-01-15", "quantity": 1},
                    {"serialNo": "S-2", "batchNo": "B-2", "quantity": 1}
                ]
            }),
            json!({"partId": "P1", "serialNo": "S-9", "batchNo": "B-9", "quantity": 1}),
        ]);
        let records = group_by_vin(&movements);
        let record = &records[0];
        assert_eq!(record.serial_no.as_deref(), Some("S-1"));
        assert_eq!(record.batch_no.as_deref(), Some("B-1"));
        assert_eq!(record.production_date, NaiveDate::from_ymd_opt(2023, 1, 15));
        assert_eq!(record.part_lots.len(), 3);
        assert_eq!(record.part_lots[2].serial_no.as_deref(), Some("S-9"));
    }

    #[test]
    fn projections_use_directory_names() {
        let mut directory = CenterDirectory::new();
        directory.insert("4", "EVS Hải Phòng");
        let service = TraceabilityService::new(Arc::new(directory));
        let movement = normalize(&json!({
            "partNo": "A", "centerId": 4, "note": "Lắp mới",
            "appointmentNote": "Bảo hành pin", "quantity": 2
        }));
        let records = service.group_by_vin(&[movement]);
        let projection = &records[0].movements[0];
        assert_eq!(projection.center_name.as_deref(), Some("EVS Hải Phòng"));
        assert_eq!(projection.note.as_deref(), Some("Lắp mới"));
        assert_eq!(projection.appointment_note.as_deref(), Some("Bảo hành pin"));
        assert_eq!(projection.quantity, Some(dec!(2)));
    }

    #[test]
    fn trace_reports_counts() {
        let body = json!({
            "content": [
                {"partId": "P1", "direction": "IN"},
                {"partId": "P1", "direction": "OUT"},
                {"note": "orphan"}
            ],
            "totalElements": 3
        });
        let report = TraceabilityService::default()
            .trace(&VinQuery::new("rlnv5jsf1pm000123"), &body)
            .unwrap();
        assert_eq!(report.vin, "RLNV5JSF1PM000123");
        assert_eq!(report.movement_count, 3);
        assert_eq!(report.unattributed_count, 1);
        assert_eq!(report.parts.len(), 1);
    }

    #[test]
    fn empty_trace_is_not_an_error() {
        let report = TraceabilityService::default()
            .trace(&VinQuery::new("RLNV5JSF1PM000123"), &json!([]))
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.movement_count, 0);
    }

    #[test]
    fn invalid_vin_is_rejected() {
        let result = TraceabilityService::default().trace(&VinQuery::new("bad"), &json!([]));
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }
}
