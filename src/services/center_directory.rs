use std::collections::HashMap;

use serde_json::Value;

use crate::models::Movement;
use crate::services::envelope::unwrap_envelope;
use crate::services::field_resolver::AliasTable;

const CENTER_ID: AliasTable = AliasTable::new("center.id", &["id", "centerId", "serviceCenterId"]);
const CENTER_NAME: AliasTable =
    AliasTable::new("center.name", &["name", "centerName", "serviceCenterName"]);

/// Already-resolved `centerId -> centerName` lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CenterDirectory {
    names: HashMap<String, String>,
}

impl CenterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the directory from a center-list response body of any envelope shape.
    /// Entries lacking an id or a name are skipped.
    pub fn from_body(body: &Value) -> Self {
        let unwrapped = unwrap_envelope(body, 0);
        unwrapped
            .items
            .iter()
            .filter_map(|record| Some((CENTER_ID.text(record)?, CENTER_NAME.text(record)?)))
            .collect()
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn name_for(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// `centerName`, else the directory name for `centerId`, else `centerId`.
    pub fn label_for(&self, movement: &Movement) -> Option<String> {
        movement
            .center_name
            .clone()
            .or_else(|| {
                movement
                    .center_id
                    .as_deref()
                    .and_then(|id| self.name_for(id))
                    .map(str::to_string)
            })
            .or_else(|| movement.center_id.clone())
    }

    /// Display name only: `centerName`, else the directory name for `centerId`.
    pub fn display_name_for(&self, movement: &Movement) -> Option<String> {
        movement.center_name.clone().or_else(|| {
            movement
                .center_id
                .as_deref()
                .and_then(|id| self.name_for(id))
                .map(str::to_string)
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for CenterDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
