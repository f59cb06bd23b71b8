use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use crate::models::{Lot, Movement};
use crate::services::field_resolver::AliasTable;
use crate::services::movement_normalizer::normalize;

/// Lot-level candidate paths: flat, nested under `part`, nested under `partLot`.
pub mod aliases {
    use crate::services::field_resolver::AliasTable;

    pub const PART_NO: AliasTable = AliasTable::new(
        "lot.partNo",
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
        "lot.partName",
        &[
            "partName",
            "part.partName",
            "part.name",
            "partLot.partName",
            "partLot.part.partName",
        ],
    );
    pub const SERIAL_NO: AliasTable = AliasTable::new(
        "lot.serialNo",
        &[
            "serialNo",
            "serialNumber",
            "part.serialNo",
            "partLot.serialNo",
            "partLot.serialNumber",
        ],
    );
    pub const BATCH_NO: AliasTable = AliasTable::new(
        "lot.batchNo",
        &[
            "batchNo",
            "batchNumber",
            "part.batchNo",
            "partLot.batchNo",
            "partLot.batchNumber",
        ],
    );
    pub const MFG_DATE: AliasTable = AliasTable::new(
        "lot.mfgDate",
        &[
            "mfgDate",
            "manufactureDate",
            "productionDate",
            "partLot.mfgDate",
            "partLot.manufactureDate",
        ],
    );
    pub const QUANTITY: AliasTable =
        AliasTable::new("lot.quantity", &["quantity", "qty", "partLot.quantity"]);

    pub const ALL: [AliasTable; 6] = [PART_NO, PART_NAME, SERIAL_NO, BATCH_NO, MFG_DATE, QUANTITY];
}

/// Quantity of one raw lot line item, clamped at zero; zero when absent.
pub fn lot_quantity(raw: &Value) -> Decimal {
    aliases::QUANTITY
        .decimal(raw)
        .map(|quantity| quantity.max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO)
}

/// Resolves the lot line items a movement carries.
///
/// Real lot line items are resolved one by one. A movement without any gets a
/// single implied lot built from its top-level fields, provided it carries some
/// part identity or a top-level quantity; otherwise the result is empty.
pub fn resolve_lots(movement: &Movement) -> Vec<Lot> {
    if !movement.part_lots.is_empty() {
        return movement
            .part_lots
            .iter()
            .map(|raw| resolve_lot(raw, movement))
            .collect();
    }

    match synthesize_lot(movement) {
        Some(lot) => vec![lot],
        None => Vec::new(),
    }
}

/// Resolves lots straight from a raw movement or detail record.
pub fn resolve_record_lots(raw: &Value) -> Vec<Lot> {
    resolve_lots(&normalize(raw))
}

/// Resolves one lot element, falling back to the parent's part identity.
pub fn resolve_lot(raw: &Value, parent: &Movement) -> Lot {
    Lot {
        part_no: text_or(&aliases::PART_NO, raw, parent.part_no.as_ref()),
        part_name: text_or(&aliases::PART_NAME, raw, parent.part_name.as_ref()),
        serial_no: aliases::SERIAL_NO.text(raw),
        batch_no: aliases::BATCH_NO.text(raw),
        mfg_date: aliases::MFG_DATE.date(raw),
        quantity: lot_quantity(raw),
        synthesized: false,
    }
}

fn synthesize_lot(movement: &Movement) -> Option<Lot> {
    let carries_quantity = movement.total_quantity.is_some() || movement.quantity.is_some();
    if !movement.has_part_identity() && !carries_quantity {
        return None;
    }

    let quantity = movement
        .total_quantity
        .or(movement.quantity)
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO);

    Some(Lot {
        part_no: movement.part_no.clone(),
        part_name: movement.part_name.clone(),
        serial_no: movement.serial_no.clone(),
        batch_no: movement.batch_no.clone(),
        mfg_date: movement.mfg_date,
        quantity,
        synthesized: true,
    })
}

fn text_or(table: &AliasTable, raw: &Value, fallback: Option<&String>) -> Option<String> {
    table.text(raw).or_else(|| fallback.cloned())
}

/// Sum of resolved lot quantities.
pub fn total_lot_quantity(lots: &[Lot]) -> Decimal {
    sum_quantities(lots.iter().map(|lot| lot.quantity))
}

/// Sums quantities, saturating at [`Decimal::MAX`] instead of overflowing.
pub fn sum_quantities(quantities: impl IntoIterator<Item = Decimal>) -> Decimal {
    let mut saturated = false;
    let total = quantities
        .into_iter()
        .fold(Decimal::ZERO, |acc, quantity| match acc.checked_add(quantity) {
            Some(sum) => sum,
            None => {
                saturated = true;
                acc.saturating_add(quantity)
            }
        });
    if saturated {
        warn!("Lot quantity sum overflowed; saturated at {}", total);
    }
    total
}
