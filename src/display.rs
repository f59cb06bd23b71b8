//! Presentation helpers for ledger rows and trace reports.
//!
//! Absent values render as [`PLACEHOLDER`] so gaps stay distinguishable from zero.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::{Direction, Reason};

pub const PLACEHOLDER: &str = "—";

pub fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => PLACEHOLDER,
    }
}

/// Known directions get a label; others show their raw value.
pub fn direction_label(direction: Option<&Direction>) -> String {
    match direction {
        Some(Direction::In) => "Nhập".to_string(),
        Some(Direction::Out) => "Xuất".to_string(),
        Some(Direction::Other(raw)) => raw.clone(),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn reason_label(reason: Option<&Reason>) -> String {
    let label = match reason {
        Some(Reason::ShipmentIn) => "Nhập theo lô hàng",
        Some(Reason::ShipmentOut) => "Xuất theo lô hàng",
        Some(Reason::ServiceUse) => "Sử dụng cho dịch vụ",
        Some(Reason::Return) => "Trả lại",
        Some(Reason::Adjustment) => "Điều chỉnh",
        Some(Reason::Other(raw)) => raw.as_str(),
        None => PLACEHOLDER,
    };
    label.to_string()
}

pub fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_date(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_quantity(value: Option<Decimal>) -> String {
    value
        .map(|quantity| quantity.normalize().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
