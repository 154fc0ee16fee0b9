use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use super::domain::CatalogItem;
use super::repository::{CatalogRepository, RepositoryError};

/// Catalog persisted as a pretty-printed JSON array on disk.
///
/// A missing file reads as an empty catalog. Writes go to a temporary file in
/// the same directory and are renamed over the target, so readers see either
/// the old or the new list.
#[derive(Debug)]
pub struct JsonFileCatalog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl CatalogRepository for JsonFileCatalog {
    fn read_all(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| RepositoryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, items: &[CatalogItem]) -> Result<(), RepositoryError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("catalog write lock poisoned".to_string()))?;

        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|err| self.io_error(err))?;

        let mut staged = NamedTempFile::new_in(&dir).map_err(|err| self.io_error(err))?;
        serde_json::to_writer_pretty(&mut staged, items).map_err(|source| {
            RepositoryError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        staged
            .write_all(b"\n")
            .and_then(|_| staged.flush())
            .map_err(|err| self.io_error(err))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        debug!(path = %self.path.display(), count = items.len(), "catalog written");
        Ok(())
    }
}
