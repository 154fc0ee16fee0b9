use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// In-memory admin sessions keyed by random id.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Instant>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions();
        let now = Instant::now();
        sessions.retain(|_, expires| *expires > now);
        sessions.insert(id.clone(), now + self.ttl);
        id
    }

    pub fn is_live(&self, id: &str) -> bool {
        let mut sessions = self.sessions();
        match sessions.get(id) {
            Some(expires) if *expires > Instant::now() => true,
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    pub fn revoke(&self, id: &str) {
        self.sessions().remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poisoning is ignored; the map holds no cross-entry invariants.
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_expire_after_ttl() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create();
        assert!(!store.is_live(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let first = store.create();
        let second = store.create();
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_ids_are_not_live() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(!store.is_live("nope"));
    }
}
