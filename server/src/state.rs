//! Shared handler state.

use jobtrack::{
    ApplicationStore, Config, Database, DocumentStore, FieldValueStore, UploadPolicy,
    UploadStorage,
};

/// Stores and upload collaborators built over one database handle.
#[derive(Clone)]
pub struct AppState {
    pub values: FieldValueStore,
    pub applications: ApplicationStore,
    pub docs: DocumentStore,
    pub uploads: UploadStorage,
    pub policy: UploadPolicy,
}

impl AppState {
    /// Opens the database named by `config` and builds the stores over it.
    pub fn open(config: &Config) -> jobtrack::Result<Self> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::new(db, config))
    }

    pub fn new(db: Database, config: &Config) -> Self {
        let values = FieldValueStore::new(db.clone());
        let applications = ApplicationStore::new(db.clone(), values.clone());
        let docs = DocumentStore::new(db);

        Self {
            values,
            applications,
            docs,
            uploads: UploadStorage::new(&config.uploads_path),
            policy: UploadPolicy::new(config.upload.max_bytes),
        }
    }
}
