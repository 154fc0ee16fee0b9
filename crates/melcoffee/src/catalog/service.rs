use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;

use super::domain::{CatalogItem, CoffeeId};
use super::repository::{CatalogRepository, RepositoryError};
use crate::recommend::{PreferenceAnswers, RecommendationEngine, ScoredResult};

/// Service composing the catalog repository and the recommendation engine.
///
/// Mutations run read-modify-write against the repository under a single
/// lock so concurrent edits cannot drop each other's changes.
pub struct CatalogService<R> {
    repository: Arc<R>,
    engine: Arc<RecommendationEngine>,
    mutation: Mutex<()>,
}

impl<R> CatalogService<R>
where
    R: CatalogRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: RecommendationEngine) -> Self {
        Self {
            repository,
            engine: Arc::new(engine),
            mutation: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn list(&self) -> Result<Vec<CatalogItem>, CatalogServiceError> {
        Ok(self.repository.read_all()?)
    }

    /// Rank the current catalog against `answers`.
    pub fn recommend(
        &self,
        answers: &PreferenceAnswers,
        limit: Option<NonZeroUsize>,
    ) -> Result<Vec<ScoredResult>, CatalogServiceError> {
        let items = self.repository.read_all()?;
        let limit = limit.unwrap_or_else(|| self.engine.default_limit());
        Ok(self.engine.rank(&items, answers, limit))
    }

    /// Append a new item built from operator supplied fields.
    pub fn create(&self, fields: Map<String, Value>) -> Result<CatalogItem, CatalogServiceError> {
        let _guard = self.lock()?;
        let mut items = self.repository.read_all()?;

        let id = allocate_id(&items, now_millis());
        let item = CatalogItem::from_object(id, fields).map_err(CatalogServiceError::InvalidItem)?;
        items.push(item.clone());
        self.repository.write_all(&items)?;

        info!(id = %item.id, name = item.name().unwrap_or_default(), "catalog item created");
        Ok(item)
    }

    /// Shallow-merge `patch` into the item with `id`.
    pub fn update(
        &self,
        id: CoffeeId,
        patch: Map<String, Value>,
    ) -> Result<CatalogItem, CatalogServiceError> {
        let _guard = self.lock()?;
        let mut items = self.repository.read_all()?;

        let slot = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CatalogServiceError::NotFound(id))?;
        let updated = slot.merged(patch).map_err(CatalogServiceError::InvalidItem)?;
        *slot = updated.clone();
        self.repository.write_all(&items)?;

        info!(id = %id, "catalog item updated");
        Ok(updated)
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn delete(&self, id: CoffeeId) -> Result<bool, CatalogServiceError> {
        let _guard = self.lock()?;
        let mut items = self.repository.read_all()?;

        let before = items.len();
        items.retain(|item| item.id != id);
        let removed = items.len() != before;
        if removed {
            self.repository.write_all(&items)?;
            info!(id = %id, "catalog item deleted");
        }
        Ok(removed)
    }

    /// Add a batch of drafts, optionally replacing the existing catalog.
    pub fn import(
        &self,
        drafts: Vec<Map<String, Value>>,
        replace: bool,
    ) -> Result<Vec<CatalogItem>, CatalogServiceError> {
        let _guard = self.lock()?;
        let mut items = if replace {
            Vec::new()
        } else {
            self.repository.read_all()?
        };

        let mut created = Vec::with_capacity(drafts.len());
        let base = now_millis();
        for draft in drafts {
            let id = allocate_id(&items, base);
            let item =
                CatalogItem::from_object(id, draft).map_err(CatalogServiceError::InvalidItem)?;
            items.push(item.clone());
            created.push(item);
        }
        self.repository.write_all(&items)?;

        info!(count = created.len(), replace, "catalog import applied");
        Ok(created)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CatalogServiceError> {
        self.mutation.lock().map_err(|_| {
            CatalogServiceError::Repository(RepositoryError::Unavailable(
                "catalog mutation lock poisoned".to_string(),
            ))
        })
    }
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Timestamp-derived id, bumped past any id already in use.
pub(crate) fn allocate_id(items: &[CatalogItem], timestamp_ms: u64) -> CoffeeId {
    let taken: HashSet<u64> = items.iter().map(|item| item.id.0).collect();
    let mut candidate = timestamp_ms;
    while taken.contains(&candidate) {
        candidate = candidate.wrapping_add(1);
    }
    CoffeeId(candidate)
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("coffee {0} not found")]
    NotFound(CoffeeId),
    #[error("invalid catalog item: {0}")]
    InvalidItem(#[source] serde_json::Error),
}
