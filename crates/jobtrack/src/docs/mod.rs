//! Document attachments: metadata linking stored files to applications.
//!
//! The bytes live wherever the upload collaborator put them; this store only
//! records the opaque stored-path handle it returned.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::db::{application_repo, doc_repo, Database};
use crate::error::StoreError;
use crate::sanitize;
use crate::timestamp;

/// A document attached to an application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationDoc {
    pub id: i64,
    pub application_id: i64,
    pub filename: String,
    pub mime_type: String,
    /// Opaque handle issued by the upload storage.
    #[serde(skip_serializing)]
    pub stored_path: String,
    pub uploaded_at: String,
}

#[derive(Clone)]
pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Records an already validated and stored upload. Returns the new
    /// document id.
    pub fn add_doc(
        &self,
        application_id: i64,
        filename: &str,
        mime_type: &str,
        stored_path: &str,
    ) -> Result<i64, StoreError> {
        let uploaded_at = timestamp::now_iso();
        let id = self.db.with_transaction(|conn| {
            if !application_repo::exists(conn, application_id)? {
                return Err(StoreError::not_found(format!(
                    "application {}",
                    application_id
                )));
            }
            Ok(doc_repo::insert(
                conn,
                application_id,
                filename,
                mime_type,
                stored_path,
                &uploaded_at,
            )?)
        })?;

        info!(
            id,
            application_id,
            stored = %sanitize::redact_path(std::path::Path::new(stored_path)),
            "document recorded"
        );
        Ok(id)
    }

    pub fn get_doc(&self, id: i64) -> Result<ApplicationDoc, StoreError> {
        self.db
            .with_conn(|conn| doc_repo::find_by_id(conn, id))?
            .ok_or_else(|| StoreError::not_found(format!("document {}", id)))
    }

    /// Documents grouped by application, newest first within each group.
    /// Every requested id gets an entry, empty when it has no documents.
    pub fn list_docs_by_application_ids(
        &self,
        application_ids: &[i64],
    ) -> Result<BTreeMap<i64, Vec<ApplicationDoc>>, StoreError> {
        let docs = self
            .db
            .with_conn(|conn| doc_repo::list_by_application_ids(conn, application_ids))?;

        let mut grouped: BTreeMap<i64, Vec<ApplicationDoc>> = application_ids
            .iter()
            .map(|id| (*id, Vec::new()))
            .collect();
        for doc in docs {
            grouped.entry(doc.application_id).or_default().push(doc);
        }
        Ok(grouped)
    }
}
