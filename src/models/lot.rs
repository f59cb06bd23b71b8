use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A traceable batch/serial unit of a part, resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub part_no: Option<String>,
    pub part_name: Option<String>,
    pub serial_no: Option<String>,
    pub batch_no: Option<String>,
    pub mfg_date: Option<NaiveDate>,
    /// Never negative; zero when the upstream line item carries no quantity.
    pub quantity: Decimal,
    /// True when the lot was implied from a movement's top-level fields.
    pub synthesized: bool,
}
