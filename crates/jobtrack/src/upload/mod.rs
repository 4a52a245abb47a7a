//! Upload collaborator: checks an incoming file against the attachment
//! policy and persists its bytes, handing back a stored-path handle for the
//! document store.

pub mod policy;
pub mod storage;

pub use policy::{UploadPolicy, DEFAULT_MAX_UPLOAD_BYTES};
pub use storage::UploadStorage;
