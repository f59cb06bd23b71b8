/// Query parameter types shared by the ledger and traceability services
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::ServiceError;
use crate::models::{Direction, Movement, Reason};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 500;

static VIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("valid VIN pattern"));

/// Inclusive calendar-day range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parses `YYYY-MM-DD` bounds and rejects an end before the start.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ServiceError> {
        let start = start.map(|raw| parse_day(raw, "start")).transpose()?;
        let end = end.map(|raw| parse_day(raw, "end")).transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(ServiceError::ValidationError(format!(
                    "End date {} is before start date {}",
                    end, start
                )));
            }
        }

        Ok(Self { start, end })
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// An undated movement never falls inside a bounded range.
    pub fn contains(&self, moved_at: Option<DateTime<Utc>>) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(day) = moved_at.map(|ts| ts.date_naive()) else {
            return false;
        };
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }
}

fn parse_day(raw: &str, label: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ServiceError::ValidationError(format!("Invalid {} date format: {}", label, e))
    })
}

/// Filters for the movement ledger; passed to the search endpoint as-is and
/// also applicable to an already-loaded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFilter {
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub center_id: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_direction_filter")]
    pub direction: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub reason: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_iso_date")]
    pub from_date: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_iso_date")]
    pub to_date: Option<String>,

    /// Zero-based page index.
    #[serde(default)]
    pub page: u64,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 500))]
    pub size: u32,
}

impl Default for LedgerFilter {
    fn default() -> Self {
        Self {
            center_id: None,
            direction: None,
            reason: None,
            from_date: None,
            to_date: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl LedgerFilter {
    /// Validates the filter and compiles it into a movement predicate.
    pub fn active(&self) -> Result<ActiveFilter, ServiceError> {
        self.validate()?;
        Ok(ActiveFilter {
            center_id: self.center_id.clone(),
            direction: self.direction.as_deref().and_then(Direction::parse),
            reason: self.reason.as_deref().and_then(Reason::parse),
            range: DateRange::parse(self.from_date.as_deref(), self.to_date.as_deref())?,
        })
    }

    /// Query parameters for the upstream search endpoint.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(center_id) = &self.center_id {
            params.push(("centerId".to_string(), center_id.clone()));
        }
        if let Some(direction) = self.direction.as_deref().and_then(Direction::parse) {
            params.push(("direction".to_string(), direction.to_string()));
        }
        if let Some(reason) = self.reason.as_deref().and_then(Reason::parse) {
            params.push(("reason".to_string(), reason.to_string()));
        }
        if let Some(from) = &self.from_date {
            params.push(("fromDate".to_string(), from.trim().to_string()));
        }
        if let Some(to) = &self.to_date {
            params.push(("toDate".to_string(), to.trim().to_string()));
        }
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("size".to_string(), self.size.to_string()));
        params
    }
}

/// A validated ledger filter ready to test movements against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilter {
    pub center_id: Option<String>,
    pub direction: Option<Direction>,
    pub reason: Option<Reason>,
    pub range: DateRange,
}

impl ActiveFilter {
    pub fn matches(&self, movement: &Movement) -> bool {
        if let Some(center_id) = &self.center_id {
            if movement.center_id.as_ref() != Some(center_id) {
                return false;
            }
        }
        if self.direction.is_some() && movement.direction != self.direction {
            return false;
        }
        if self.reason.is_some() && movement.reason != self.reason {
            return false;
        }
        self.range.contains(movement.moved_at)
    }
}

/// Vehicle identification number for a traceability query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VinQuery {
    #[validate(custom = "validate_vin")]
    pub vin: String,
}

impl VinQuery {
    /// Trims and uppercases the input; call [`VinQuery::canonical`] to validate.
    pub fn new(vin: impl AsRef<str>) -> Self {
        Self {
            vin: vin.as_ref().trim().to_uppercase(),
        }
    }

    pub fn canonical(&self) -> Result<&str, ServiceError> {
        self.validate()?;
        Ok(&self.vin)
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn validate_direction_filter(value: &str) -> Result<(), ValidationError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "IN" | "OUT" => Ok(()),
        _ => {
            let mut err = ValidationError::new("direction");
            err.message = Some("Must be one of: IN, OUT".into());
            Err(err)
        }
    }
}

fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    if NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("date");
        err.message = Some("Dates must use the YYYY-MM-DD format".into());
        Err(err)
    }
}

fn validate_vin(value: &str) -> Result<(), ValidationError> {
    if VIN_PATTERN.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("vin");
        err.message = Some("VIN must be 17 characters from A-H, J-N, P, R-Z and 0-9".into());
        Err(err)
    }
}
