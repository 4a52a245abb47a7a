//! Which files may be attached to an application.

use std::path::Path;

use crate::error::UploadError;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl UploadPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Checks an upload and returns the MIME type to record.
    ///
    /// The extension must always be allowed. A declared MIME type must be
    /// allowed too; clients that send none get the type guessed from the
    /// extension.
    pub fn check(&self, filename: &str, mime_type: &str, size: u64) -> Result<String, UploadError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let extension_ok = extension
            .as_deref()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));

        let mime_type = mime_type.trim();
        let type_ok = mime_type.is_empty() || ALLOWED_MIME_TYPES.contains(&mime_type);

        if !(extension_ok && type_ok) {
            return Err(UploadError::UnsupportedType);
        }

        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        if mime_type.is_empty() {
            Ok(mime_guess::from_path(filename)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string())
        } else {
            Ok(mime_type.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types_pass() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.check("cv.pdf", "application/pdf", 1024).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            policy.check("NOTES.TXT", "text/plain", 10).unwrap(),
            "text/plain"
        );
    }

    #[test]
    fn test_extension_checked_even_with_allowed_type() {
        let policy = UploadPolicy::default();
        assert!(matches!(
            policy.check("cv.exe", "application/pdf", 10),
            Err(UploadError::UnsupportedType)
        ));
        assert!(matches!(
            policy.check("cv", "application/pdf", 10),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn test_disallowed_type_rejected() {
        let policy = UploadPolicy::default();
        assert!(matches!(
            policy.check("cv.pdf", "image/png", 10),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn test_missing_type_falls_back_to_extension() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.check("cv.pdf", "", 10).unwrap(), "application/pdf");
        assert_eq!(
            policy.check("cv.docx", "", 10).unwrap(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }

    #[test]
    fn test_size_ceiling() {
        let policy = UploadPolicy::default();
        assert!(policy
            .check("cv.pdf", "application/pdf", DEFAULT_MAX_UPLOAD_BYTES)
            .is_ok());
        assert!(matches!(
            policy.check("cv.pdf", "application/pdf", DEFAULT_MAX_UPLOAD_BYTES + 1),
            Err(UploadError::TooLarge { .. })
        ));
    }
}
