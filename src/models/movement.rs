use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;
use strum::EnumString;

/// Whether a movement increases (IN) or decreases (OUT) center inventory.
///
/// Upstream values that are neither label are carried through uppercased in
/// `Other` and never compare equal to `In`/`Out`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    In,
    Out,
    #[strum(default)]
    Other(String),
}

impl Direction {
    /// Parses an upstream direction case-insensitively. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }
        match Direction::from_str(&upper) {
            Ok(direction) => Some(direction),
            Err(_) => Some(Direction::Other(upper)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_inbound(&self) -> bool {
        matches!(self, Self::In)
    }

    pub fn is_outbound(&self) -> bool {
        matches!(self, Self::Out)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Business cause code for a movement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    ShipmentIn,
    ShipmentOut,
    ServiceUse,
    Return,
    Adjustment,
    #[strum(default)]
    Other(String),
}

impl Reason {
    /// Parses an upstream reason code case-insensitively. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }
        match Reason::from_str(&upper) {
            Ok(reason) => Some(reason),
            Err(_) => Some(Reason::Other(upper)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ShipmentIn => "SHIPMENT_IN",
            Self::ShipmentOut => "SHIPMENT_OUT",
            Self::ServiceUse => "SERVICE_USE",
            Self::Return => "RETURN",
            Self::Adjustment => "ADJUSTMENT",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where a movement's `total_quantity` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuantitySource {
    /// Supplied upstream as an explicit total.
    Explicit,
    /// Sum of the movement's lot line item quantities.
    LotSum,
    /// Single top-level `quantity` field.
    TopLevel,
    /// Nothing to derive from.
    Absent,
}

impl QuantitySource {
    pub fn is_derived(self) -> bool {
        matches!(self, Self::LotSum | Self::TopLevel)
    }
}

/// Canonical inventory movement, built once from a raw upstream record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    pub direction: Option<Direction>,
    pub reason: Option<Reason>,
    pub center_id: Option<String>,
    pub center_name: Option<String>,
    pub moved_at: Option<DateTime<Utc>>,

    pub part_id: Option<String>,
    pub part_no: Option<String>,
    pub part_name: Option<String>,
    pub serial_no: Option<String>,
    pub batch_no: Option<String>,
    pub mfg_date: Option<NaiveDate>,

    /// Raw lot line items in upstream order; resolved on demand by the lot resolver.
    pub part_lots: Vec<Value>,
    /// Explicit total as supplied upstream.
    pub explicit_total: Option<Decimal>,
    /// Top-level `quantity` as supplied upstream.
    pub quantity: Option<Decimal>,
    pub total_quantity: Option<Decimal>,
    pub quantity_source: QuantitySource,

    pub appointment_id: Option<String>,
    pub appointment_note: Option<String>,
    pub shipment_code: Option<String>,
    pub shipment_status: Option<String>,
    pub vin: Option<String>,
    pub note: Option<String>,
}

impl Movement {
    /// Identity used to bucket movements by physical part: `part_id`, else `part_no`.
    pub fn part_key(&self) -> Option<&str> {
        self.part_id.as_deref().or(self.part_no.as_deref())
    }

    pub fn has_part_identity(&self) -> bool {
        self.part_no.is_some()
            || self.part_name.is_some()
            || self.serial_no.is_some()
            || self.batch_no.is_some()
    }

    pub fn is_attributable_to_center(&self) -> bool {
        self.center_id.is_some() || self.center_name.is_some()
    }
}
