//! Validated CRUD over applications.

use tracing::{debug, info};

use super::validate::{check_fields, normalize_applied_on, CheckedFields};
use super::{Application, ApplicationInput};
use crate::db::application_repo;
use crate::db::Database;
use crate::error::StoreError;
use crate::timestamp;
use crate::values::{FieldType, FieldValueStore};

#[derive(Clone)]
pub struct ApplicationStore {
    db: Database,
    values: FieldValueStore,
}

impl ApplicationStore {
    pub fn new(db: Database, values: FieldValueStore) -> Self {
        Self { db, values }
    }

    pub fn list(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.db.with_conn(application_repo::list)?)
    }

    pub fn get(&self, id: i64) -> Result<Application, StoreError> {
        self.db
            .with_conn(|conn| application_repo::find_by_id(conn, id))?
            .ok_or_else(|| StoreError::not_found(format!("application {}", id)))
    }

    /// Validates and stores a new application, returning its id.
    pub fn create(&self, input: &ApplicationInput) -> Result<i64, StoreError> {
        let fields = check_fields(input)?;
        self.check_references(&fields, None)?;
        let fields = normalize_applied_on(fields)?;

        let last_updated = timestamp::now_iso();
        let id = self
            .db
            .with_conn(|conn| application_repo::insert(conn, &fields, &last_updated))?;

        info!(id, "application created");
        Ok(id)
    }

    /// Replaces an application with freshly validated input.
    ///
    /// An `id` inside `input` must match `id`. `last_updated` is always reset
    /// to the current time.
    pub fn update(&self, id: i64, input: &ApplicationInput) -> Result<Application, StoreError> {
        if let Some(body_id) = input.id {
            if body_id != id {
                return Err(StoreError::conflict(format!(
                    "id mismatch: path {} vs body {}",
                    id, body_id
                )));
            }
        }

        let fields = check_fields(input)?;
        let current = self.get(id)?;
        self.check_references(&fields, Some(&current))?;
        let fields = normalize_applied_on(fields)?;

        let last_updated = timestamp::now_iso();
        let affected = self
            .db
            .with_conn(|conn| application_repo::update(conn, id, &fields, &last_updated))?;
        if affected == 0 {
            return Err(StoreError::not_found(format!("application {}", id)));
        }

        debug!(id, "application updated");
        self.get(id)
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let affected = self
            .db
            .with_conn(|conn| application_repo::delete(conn, id))?;
        if affected == 0 {
            return Err(StoreError::not_found(format!("application {}", id)));
        }
        info!(id, "application deleted");
        Ok(())
    }

    /// Checks each reference against the field value store. New references
    /// must point at an active value of the matching type; a reference left
    /// unchanged by an update only has to still exist, so deactivating a
    /// value does not invalidate the records already using it.
    fn check_references(
        &self,
        fields: &CheckedFields,
        current: Option<&Application>,
    ) -> Result<(), StoreError> {
        self.check_reference(
            FieldType::Status,
            fields.status,
            current.map(|app| app.status),
        )?;
        self.check_reference(
            FieldType::LastStep,
            fields.last_step,
            current.map(|app| app.last_step),
        )?;
        if let Some(modality) = fields.modality {
            self.check_reference(
                FieldType::Modality,
                modality,
                current.and_then(|app| app.modality),
            )?;
        }
        Ok(())
    }

    fn check_reference(
        &self,
        field_type: FieldType,
        id: i64,
        current: Option<i64>,
    ) -> Result<(), StoreError> {
        let unchanged = current == Some(id);
        match self.values.find(id)? {
            Some(value) if value.field_type == field_type && (value.is_active || unchanged) => {
                Ok(())
            }
            Some(value) if value.field_type == field_type => Err(StoreError::invalid(format!(
                "{}: value {} is inactive",
                field_type, id
            ))),
            _ => Err(StoreError::invalid(format!(
                "{}: {} is not a valid {} value",
                field_type, id, field_type
            ))),
        }
    }
}
