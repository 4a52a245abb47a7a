//! Field values: the configurable, ordered options behind the `status`,
//! `last_step` and `modality` fields of an application.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub mod store;
pub mod validate;

pub use store::FieldValueStore;

/// The three enumerated application fields backed by field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Status,
    LastStep,
    Modality,
}

impl FieldType {
    pub const ALL: [FieldType; 3] = [FieldType::Status, FieldType::LastStep, FieldType::Modality];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Status => "status",
            FieldType::LastStep => "last_step",
            FieldType::Modality => "modality",
        }
    }

    /// Column of the `applications` table that references values of this type.
    pub fn application_column(&self) -> &'static str {
        match self {
            FieldType::Status => "status_id",
            FieldType::LastStep => "last_step_id",
            FieldType::Modality => "modality_id",
        }
    }

    /// Color and priority group only carry meaning for statuses.
    pub fn has_display_metadata(&self) -> bool {
        matches!(self, FieldType::Status)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(FieldType::Status),
            "last_step" => Ok(FieldType::LastStep),
            "modality" => Ok(FieldType::Modality),
            other => Err(StoreError::InvalidArgument(format!(
                "invalid field value type '{}' (expected status, last_step or modality)",
                other
            ))),
        }
    }
}

impl ToSql for FieldType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FieldType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StoreError| FromSqlError::Other(Box::new(e)))
    }
}

/// Dashboard grouping for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityGroup {
    NeedsAction,
    Waiting,
    Other,
}

impl PriorityGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityGroup::NeedsAction => "needs_action",
            PriorityGroup::Waiting => "waiting",
            PriorityGroup::Other => "other",
        }
    }
}

impl FromStr for PriorityGroup {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "needs_action" => Ok(PriorityGroup::NeedsAction),
            "waiting" => Ok(PriorityGroup::Waiting),
            "other" => Ok(PriorityGroup::Other),
            other => Err(StoreError::InvalidArgument(format!(
                "invalid priority_group '{}' (expected needs_action, waiting or other)",
                other
            ))),
        }
    }
}

impl ToSql for PriorityGroup {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PriorityGroup {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StoreError| FromSqlError::Other(Box::new(e)))
    }
}

/// A selectable option for one of the typed fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub id: i64,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub key: String,
    pub label: String,
    pub color: Option<String>,
    pub sort_order: i64,
    pub priority_group: Option<PriorityGroup>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
    /// Number of applications currently referencing this value.
    #[serde(rename = "usageCount")]
    pub usage_count: i64,
}

/// Input for creating a field value.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFieldValue {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub priority_group: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewFieldValue {
    pub fn new(field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            field_type,
            label: label.into(),
            key: None,
            color: None,
            sort_order: None,
            priority_group: None,
            is_active: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_priority_group(mut self, group: impl Into<String>) -> Self {
        self.priority_group = Some(group.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = Some(false);
        self
    }
}

/// Partial update of a field value. `None` leaves the field untouched; for
/// `color` and `priority_group` an empty string clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldValuePatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub priority_group: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// What `FieldValueStore::delete` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The value was unused and removed outright.
    Deleted,
    /// References were remapped to `into` before removal.
    Merged { into: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_round_trips_through_str() {
        for ty in FieldType::ALL {
            assert_eq!(ty.as_str().parse::<FieldType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_field_type_is_invalid_argument() {
        let err = "stage".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_application_columns() {
        assert_eq!(FieldType::Status.application_column(), "status_id");
        assert_eq!(FieldType::LastStep.application_column(), "last_step_id");
        assert_eq!(FieldType::Modality.application_column(), "modality_id");
    }

    #[test]
    fn test_new_field_value_deserializes_with_defaults() {
        let input: NewFieldValue =
            serde_json::from_str(r##"{"type":"status","label":"Waiting","color":"#FFD600"}"##)
                .unwrap();
        assert_eq!(input.field_type, FieldType::Status);
        assert_eq!(input.label, "Waiting");
        assert_eq!(input.color.as_deref(), Some("#FFD600"));
        assert!(input.key.is_none());
        assert!(input.is_active.is_none());
    }

    #[test]
    fn test_field_value_serializes_usage_count() {
        let value = FieldValue {
            id: 1,
            field_type: FieldType::LastStep,
            key: "phone_screen".to_string(),
            label: "Phone screen".to_string(),
            color: None,
            sort_order: 2,
            priority_group: None,
            is_active: true,
            created_at: "2024-01-15T00:00:00.000Z".to_string(),
            updated_at: None,
            usage_count: 3,
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "last_step");
        assert_eq!(json["usageCount"], 3);
    }
}
