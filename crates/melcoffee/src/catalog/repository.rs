use std::path::PathBuf;

use super::domain::CatalogItem;

/// Durable home of the catalog. Implementations hand out whole snapshots and
/// accept whole replacements; item-level edits happen in the service.
pub trait CatalogRepository: Send + Sync {
    /// Every stored item, in stored order.
    fn read_all(&self) -> Result<Vec<CatalogItem>, RepositoryError>;
    fn write_all(&self, items: &[CatalogItem]) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("catalog file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog file {path} is not a valid item list: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
