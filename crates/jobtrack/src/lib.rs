pub mod applications;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod sanitize;
pub mod timestamp;
pub mod upload;
pub mod values;

pub use applications::{Application, ApplicationInput, ApplicationStore, NumericInput};
pub use config::{load_config, Config, LogFormat};
pub use db::{Database, DatabaseError};
pub use docs::{ApplicationDoc, DocumentStore};
pub use error::{ConfigError, JobtrackError, Result, StoreError, UploadError};
pub use upload::{UploadPolicy, UploadStorage};
pub use values::{
    DeleteOutcome, FieldType, FieldValue, FieldValuePatch, FieldValueStore, NewFieldValue,
    PriorityGroup,
};
