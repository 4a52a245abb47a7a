//! CRUD over field values with per-type uniqueness, usage accounting and
//! merge-on-delete.

use tracing::{debug, info, info_span};

use super::validate::{optional_color, optional_priority_group, require_label, slugify};
use super::{DeleteOutcome, FieldType, FieldValue, FieldValuePatch, NewFieldValue};
use crate::db::field_value_repo::{self, NewFieldValueRow};
use crate::db::Database;
use crate::error::StoreError;
use crate::timestamp;

#[derive(Clone)]
pub struct FieldValueStore {
    db: Database,
}

impl FieldValueStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All values of a type, ordered by `sort_order` then `label`, each with
    /// its usage count.
    pub fn list(&self, field_type: FieldType) -> Result<Vec<FieldValue>, StoreError> {
        Ok(self
            .db
            .with_conn(|conn| field_value_repo::list_by_type(conn, field_type, false))?)
    }

    /// Only the values offered for new entries.
    pub fn list_active(&self, field_type: FieldType) -> Result<Vec<FieldValue>, StoreError> {
        Ok(self
            .db
            .with_conn(|conn| field_value_repo::list_by_type(conn, field_type, true))?)
    }

    pub fn find(&self, id: i64) -> Result<Option<FieldValue>, StoreError> {
        Ok(self
            .db
            .with_conn(|conn| field_value_repo::find_by_id(conn, id))?)
    }

    pub fn get(&self, id: i64) -> Result<FieldValue, StoreError> {
        self.find(id)?
            .ok_or_else(|| StoreError::not_found(format!("field value {}", id)))
    }

    /// Creates a value and returns its id.
    pub fn create(&self, input: &NewFieldValue) -> Result<i64, StoreError> {
        let field_type = input.field_type;
        let label = require_label(&input.label)?;
        let key = input
            .key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&label));
        if key.is_empty() {
            return Err(StoreError::invalid(
                "key is required (label has no usable characters)",
            ));
        }

        let (color, priority_group) = if field_type.has_display_metadata() {
            (
                optional_color(input.color.as_deref())?,
                optional_priority_group(input.priority_group.as_deref())?,
            )
        } else {
            (None, None)
        };

        let created_at = timestamp::now_iso();
        let row = NewFieldValueRow {
            field_type,
            key: &key,
            label: &label,
            color: color.as_deref(),
            sort_order: input.sort_order.unwrap_or(0),
            priority_group,
            is_active: input.is_active.unwrap_or(true),
            created_at: &created_at,
        };

        let id = self.db.with_transaction(|conn| {
            if field_value_repo::label_or_key_taken(conn, field_type, &label, &key)? {
                return Err(StoreError::conflict(format!(
                    "a {} value with label '{}' or key '{}' already exists",
                    field_type, label, key
                )));
            }
            Ok::<_, StoreError>(field_value_repo::insert(conn, &row)?)
        })?;

        info!(id, field_type = %field_type, key = %key, "field value created");
        Ok(id)
    }

    /// Applies the fields present in `patch` and returns the updated value.
    pub fn update(&self, id: i64, patch: &FieldValuePatch) -> Result<FieldValue, StoreError> {
        let updated = self.db.with_transaction(|conn| {
            let mut value = field_value_repo::find_by_id(conn, id)?
                .ok_or_else(|| StoreError::not_found(format!("field value {}", id)))?;

            let label = match patch.label.as_deref() {
                Some(label) => Some(
                    require_label(label)
                        .map_err(|_| StoreError::invalid("label cannot be empty"))?,
                ),
                None => None,
            };
            let color = match patch.color.as_deref() {
                Some(color) => Some(optional_color(Some(color))?),
                None => None,
            };
            let priority_group = match patch.priority_group.as_deref() {
                Some(group) => Some(optional_priority_group(Some(group))?),
                None => None,
            };

            if let Some(label) = &label {
                if field_value_repo::label_taken_by_other(conn, value.field_type, label, id)? {
                    return Err(StoreError::conflict(format!(
                        "a {} value with label '{}' already exists",
                        value.field_type, label
                    )));
                }
            }

            if let Some(label) = label {
                value.label = label;
            }
            if value.field_type.has_display_metadata() {
                if let Some(color) = color {
                    value.color = color;
                }
                if let Some(group) = priority_group {
                    value.priority_group = group;
                }
            }
            if let Some(sort_order) = patch.sort_order {
                value.sort_order = sort_order;
            }
            if let Some(is_active) = patch.is_active {
                value.is_active = is_active;
            }
            value.updated_at = Some(timestamp::now_iso());

            field_value_repo::update(conn, &value)?;
            Ok::<_, StoreError>(value)
        })?;

        debug!(id, active = updated.is_active, "field value updated");
        Ok(updated)
    }

    /// Deletes a value.
    ///
    /// An unused value is removed outright. A value still referenced by
    /// applications requires `merge_into`, a value of the same type; all
    /// references are remapped to it and the value is removed in one
    /// transaction.
    pub fn delete(&self, id: i64, merge_into: Option<i64>) -> Result<DeleteOutcome, StoreError> {
        self.db.with_transaction(|conn| {
            let value = field_value_repo::find_by_id(conn, id)?
                .ok_or_else(|| StoreError::not_found(format!("field value {}", id)))?;

            if value.usage_count == 0 {
                field_value_repo::delete(conn, id)?;
                info!(id, field_type = %value.field_type, "field value deleted");
                return Ok(DeleteOutcome::Deleted);
            }

            let target_id = merge_into.ok_or_else(|| {
                StoreError::invalid(format!(
                    "value in use by {} application(s); merge target required",
                    value.usage_count
                ))
            })?;
            if target_id == id {
                return Err(StoreError::invalid("cannot merge a value into itself"));
            }
            let target = field_value_repo::find_by_id(conn, target_id)?
                .filter(|target| target.field_type == value.field_type)
                .ok_or_else(|| {
                    StoreError::invalid(format!(
                        "merge target {} not found or not a {} value",
                        target_id, value.field_type
                    ))
                })?;

            let _span = info_span!(
                "merge_delete",
                id,
                into = target.id,
                field_type = %value.field_type
            )
            .entered();

            let remapped =
                field_value_repo::reassign_references(conn, value.field_type, id, target.id)?;
            field_value_repo::delete(conn, id)?;

            info!(remapped, "field value merged and deleted");
            Ok(DeleteOutcome::Merged { into: target.id })
        })
    }
}
