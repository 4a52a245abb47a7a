use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::UploadError;
use crate::sanitize;

/// How many numbered variants of a name are tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Writes uploaded files into a single directory.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    directory: PathBuf,
}

impl UploadStorage {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Stores `content` under `<millis>_<sanitised name>` and returns the
    /// path, which callers treat as an opaque handle.
    pub fn store(&self, original_name: &str, content: &[u8]) -> Result<PathBuf, UploadError> {
        self.ensure_directory()?;
        let name = format!(
            "{}_{}",
            Utc::now().timestamp_millis(),
            sanitize::safe_filename(original_name)
        );
        self.write_unique(&name, content)
    }

    /// Reads back the bytes behind a handle issued by `store`.
    pub fn read(&self, stored_path: &Path) -> Result<Vec<u8>, UploadError> {
        std::fs::read(stored_path).map_err(|source| UploadError::Io {
            path: stored_path.to_path_buf(),
            source,
        })
    }

    /// Removes a stored file whose metadata was never recorded. A file that
    /// is already gone counts as removed.
    pub fn discard(&self, stored_path: &Path) -> Result<(), UploadError> {
        match std::fs::remove_file(stored_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(UploadError::Io {
                path: stored_path.to_path_buf(),
                source,
            }),
        }
    }

    fn ensure_directory(&self) -> Result<(), UploadError> {
        std::fs::create_dir_all(&self.directory).map_err(|source| UploadError::Io {
            path: self.directory.clone(),
            source,
        })
    }

    /// Writes to `name`, or to `stem_2.ext`, `stem_3.ext`, ... when taken.
    /// Files are opened with `create_new`, so two uploads racing for one
    /// name never share a file.
    fn write_unique(&self, name: &str, content: &[u8]) -> Result<PathBuf, UploadError> {
        let (stem, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let candidate = match (attempt, extension) {
                (1, _) => name.to_string(),
                (n, Some(ext)) => format!("{}_{}.{}", stem, n, ext),
                (n, None) => format!("{}_{}", stem, n),
            };
            let path = self.directory.join(candidate);
            match write_new(&path, content) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(source) => return Err(UploadError::Io { path, source }),
            }
        }

        Err(UploadError::Io {
            path: self.directory.join(name),
            source: std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("no free file name after {} attempts", MAX_NAME_ATTEMPTS),
            ),
        })
    }
}

/// Creates `path` exclusively and fills it. A partly written file is removed.
fn write_new(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = file.write_all(content) {
        drop(file);
        let _ = std::fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_writes_sanitised_name() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path().join("uploads"));

        let path = storage.store("my cv.pdf", b"%PDF-1.4").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("_my_cv.pdf"));
        assert!(path.starts_with(storage.directory()));
        assert_eq!(storage.read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_taken_names_get_numbered() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path());

        let first = storage.write_unique("1_cv.txt", b"one").unwrap();
        let second = storage.write_unique("1_cv.txt", b"two").unwrap();
        let third = storage.write_unique("1_cv.txt", b"three").unwrap();
        assert!(second.ends_with("1_cv_2.txt"));
        assert!(third.ends_with("1_cv_3.txt"));
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_names_without_extension_get_numbered() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path());

        storage.write_unique("1_notes", b"a").unwrap();
        let second = storage.write_unique("1_notes", b"b").unwrap();
        assert!(second.ends_with("1_notes_2"));
    }

    #[test]
    fn test_discard_removes_file_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path());

        let path = storage.store("cv.pdf", b"%PDF").unwrap();
        storage.discard(&path).unwrap();
        assert!(!path.exists());
        storage.discard(&path).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path());
        assert!(matches!(
            storage.read(&dir.path().join("gone.pdf")),
            Err(UploadError::Io { .. })
        ));
    }
}
