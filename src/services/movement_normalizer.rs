use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::models::movement::{Direction, Movement, QuantitySource, Reason};
use crate::services::field_resolver::{as_text, as_timestamp};
use crate::services::lot_resolver::{lot_quantity, sum_quantities};

/// Candidate paths for every canonical movement field, in priority order.
///
/// `shipmentStatus` never feeds `DIRECTION`; only `SHIPMENT_STATUS` reads it.
pub mod aliases {
    use crate::services::field_resolver::AliasTable;

    pub const ID: AliasTable = AliasTable::new(
        "id",
        &["id", "movementId", "inventoryMovementId", "shipmentItemId"],
    );
    pub const DIRECTION: AliasTable = AliasTable::new(
        "direction",
        &["direction", "movementDirection", "movementType"],
    );
    pub const REASON: AliasTable =
        AliasTable::new("reason", &["reason", "movementReason", "reasonCode"]);
    pub const CENTER_ID: AliasTable = AliasTable::new(
        "centerId",
        &[
            "centerId",
            "center.id",
            "center.centerId",
            "serviceCenterId",
            "serviceCenter.id",
        ],
    );
    pub const CENTER_NAME: AliasTable = AliasTable::new(
        "centerName",
        &[
            "centerName",
            "center.name",
            "center.centerName",
            "serviceCenterName",
            "serviceCenter.name",
        ],
    );
    pub const MOVED_AT: AliasTable = AliasTable::new(
        "movedAt",
        &[
            "movedAt",
            "movementDate",
            "createdAt",
            "shippedAt",
            "receivedAt",
            "shipment.shippedAt",
        ],
    );
    pub const PART_ID: AliasTable = AliasTable::new(
        "partId",
        &["partId", "part.id", "part.partId", "partLot.partId", "partLot.part.id"],
    );
    pub const PART_NO: AliasTable = AliasTable::new(
        "partNo",
        &[
            "partNo",
            "partNumber",
            "part.partNo",
            "part.partNumber",
            "partLot.partNo",
            "partLot.part.partNo",
        ],
    );
    pub const PART_NAME: AliasTable = AliasTable::new(
        "partName",
        &[
            "partName",
            "part.partName",
            "part.name",
            "partLot.partName",
            "partLot.part.partName",
        ],
    );
    pub const SERIAL_NO: AliasTable = AliasTable::new(
        "serialNo",
        &[
            "serialNo",
            "serialNumber",
            "part.serialNo",
            "partLot.serialNo",
            "partLot.serialNumber",
        ],
    );
    pub const BATCH_NO: AliasTable = AliasTable::new(
        "batchNo",
        &[
            "batchNo",
            "batchNumber",
            "part.batchNo",
            "partLot.batchNo",
            "partLot.batchNumber",
        ],
    );
    pub const MFG_DATE: AliasTable = AliasTable::new(
        "mfgDate",
        &[
            "mfgDate",
            "manufactureDate",
            "productionDate",
            "partLot.mfgDate",
            "partLot.manufactureDate",
        ],
    );
    pub const PART_LOTS: AliasTable = AliasTable::new(
        "partLots",
        &["partLots", "lots", "partLotItems", "shipmentItems", "items"],
    );
    pub const TOTAL_QUANTITY: AliasTable =
        AliasTable::new("totalQuantity", &["totalQuantity", "totalQty"]);
    pub const QUANTITY: AliasTable =
        AliasTable::new("quantity", &["quantity", "qty", "movedQuantity"]);
    pub const APPOINTMENT_ID: AliasTable = AliasTable::new(
        "appointmentId",
        &["appointmentId", "appointment.id", "serviceAppointmentId"],
    );
    pub const APPOINTMENT_NOTE: AliasTable = AliasTable::new(
        "appointmentNote",
        &["appointmentNote", "appointment.note", "appointment.description"],
    );
    pub const SHIPMENT_CODE: AliasTable = AliasTable::new(
        "shipmentCode",
        &["shipmentCode", "shipment.code", "shipment.shipmentCode"],
    );
    pub const SHIPMENT_STATUS: AliasTable = AliasTable::new(
        "shipmentStatus",
        &["shipmentStatus", "shipment.status"],
    );
    pub const VIN: AliasTable = AliasTable::new(
        "vin",
        &[
            "vin",
            "vehicleVin",
            "vehicle.vin",
            "appointment.vin",
            "appointment.vehicle.vin",
        ],
    );
    pub const NOTE: AliasTable = AliasTable::new("note", &["note", "notes", "remark"]);

    /// Every movement-level table, for auditing.
    pub const ALL: [AliasTable; 21] = [
        ID,
        DIRECTION,
        REASON,
        CENTER_ID,
        CENTER_NAME,
        MOVED_AT,
        PART_ID,
        PART_NO,
        PART_NAME,
        SERIAL_NO,
        BATCH_NO,
        MFG_DATE,
        PART_LOTS,
        TOTAL_QUANTITY,
        QUANTITY,
        APPOINTMENT_ID,
        APPOINTMENT_NOTE,
        SHIPMENT_CODE,
        SHIPMENT_STATUS,
        VIN,
        NOTE,
    ];
}

/// Maps one raw movement or shipment-item record to a canonical [`Movement`].
///
/// Never fails; a record missing every field yields a movement whose optional
/// fields are all `None` and whose id is the empty composite `"-"`.
pub fn normalize(raw: &Value) -> Movement {
    let center_id = aliases::CENTER_ID.text(raw);
    let moved_at_raw = aliases::MOVED_AT.resolve(raw);
    let id = aliases::ID
        .text(raw)
        .unwrap_or_else(|| composite_id(center_id.as_deref(), moved_at_raw));

    let part_lots = match aliases::PART_LOTS.resolve(raw) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    let explicit_total = aliases::TOTAL_QUANTITY.decimal(raw);
    let quantity = aliases::QUANTITY.decimal(raw);
    let lot_quantities: Vec<Decimal> = part_lots.iter().map(lot_quantity).collect();
    let (total_quantity, quantity_source) =
        derive_total_quantity(explicit_total, &lot_quantities, quantity);

    Movement {
        id,
        direction: aliases::DIRECTION
            .text(raw)
            .and_then(|value| Direction::parse(&value)),
        reason: aliases::REASON
            .text(raw)
            .and_then(|value| Reason::parse(&value)),
        center_id,
        center_name: aliases::CENTER_NAME.text(raw),
        moved_at: moved_at_raw.and_then(as_timestamp),
        part_id: aliases::PART_ID.text(raw),
        part_no: aliases::PART_NO.text(raw),
        part_name: aliases::PART_NAME.text(raw),
        serial_no: aliases::SERIAL_NO.text(raw),
        batch_no: aliases::BATCH_NO.text(raw),
        mfg_date: aliases::MFG_DATE.date(raw),
        part_lots,
        explicit_total,
        quantity,
        total_quantity,
        quantity_source,
        appointment_id: aliases::APPOINTMENT_ID.text(raw),
        appointment_note: aliases::APPOINTMENT_NOTE.text(raw),
        shipment_code: aliases::SHIPMENT_CODE.text(raw),
        shipment_status: aliases::SHIPMENT_STATUS.text(raw),
        vin: aliases::VIN.text(raw),
        note: aliases::NOTE.text(raw),
    }
}

/// Normalizes every record in order.
#[instrument(skip(records), fields(count = records.len()))]
pub fn normalize_all(records: &[Value]) -> Vec<Movement> {
    let movements: Vec<Movement> = records.iter().map(normalize).collect();
    debug!(
        "Normalized {} movements, {} without a part key",
        movements.len(),
        movements.iter().filter(|m| m.part_key().is_none()).count()
    );
    movements
}

/// Explicit total wins; otherwise the lot sum; otherwise the top-level quantity
/// clamped at zero.
pub fn derive_total_quantity(
    explicit_total: Option<Decimal>,
    lot_quantities: &[Decimal],
    top_level: Option<Decimal>,
) -> (Option<Decimal>, QuantitySource) {
    if let Some(total) = explicit_total {
        return (Some(total), QuantitySource::Explicit);
    }
    if !lot_quantities.is_empty() {
        let sum = sum_quantities(lot_quantities.iter().copied());
        return (Some(sum), QuantitySource::LotSum);
    }
    match top_level {
        Some(quantity) => (Some(quantity.max(Decimal::ZERO)), QuantitySource::TopLevel),
        None => (None, QuantitySource::Absent),
    }
}

fn composite_id(center_id: Option<&str>, moved_at: Option<&Value>) -> String {
    let timestamp = moved_at.and_then(as_text).unwrap_or_default();
    format!("{}-{}", center_id.unwrap_or_default(), timestamp)
}
