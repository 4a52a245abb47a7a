//! Shared test utilities for jobtrack integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring every store to one in-memory database
//! - Builders for application input

#![allow(dead_code)]

pub mod builders;

pub use builders::*;

use jobtrack::{
    ApplicationStore, Database, DocumentStore, FieldType, FieldValueStore, NewFieldValue,
};

/// All stores sharing one fresh in-memory database.
pub struct TestHarness {
    pub db: Database,
    pub values: FieldValueStore,
    pub applications: ApplicationStore,
    pub docs: DocumentStore,
}

impl TestHarness {
    pub fn new() -> Self {
        let db = Database::open_in_memory().expect("Failed to create test database");
        let values = FieldValueStore::new(db.clone());
        let applications = ApplicationStore::new(db.clone(), values.clone());
        let docs = DocumentStore::new(db.clone());
        Self {
            db,
            values,
            applications,
            docs,
        }
    }

    /// Creates an active value with a derived key and returns its id.
    pub fn value(&self, field_type: FieldType, label: &str) -> i64 {
        self.values
            .create(&NewFieldValue::new(field_type, label))
            .expect("Failed to create field value")
    }

    /// Creates one status and one last step, returning `(status, last_step)`.
    pub fn basic_values(&self) -> (i64, i64) {
        (
            self.value(FieldType::Status, "Applied"),
            self.value(FieldType::LastStep, "Submitted"),
        )
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        self.db
            .with_conn(|conn| {
                Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                    r.get(0)
                })?)
            })
            .expect("Failed to count rows")
    }
}
