//! The stored coffee menu and the HTTP routes that serve it.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{CatalogItem, CoffeeId};
pub use import::{CatalogCsvImporter, CatalogImportError};
pub use repository::{CatalogRepository, RepositoryError};
pub use router::catalog_router;
pub use service::{CatalogService, CatalogServiceError};
pub use store::JsonFileCatalog;
