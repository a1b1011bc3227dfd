//! Durable promises.
//!
//! Every durable invocation is backed by a promise keyed by its promise id.
//! A promise completes exactly once; later invocations with the same id
//! replay the stored outcome instead of executing again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// State of a durable promise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromiseState {
    /// Created but not yet completed
    Pending,
    /// Completed successfully with an encoded result
    Resolved(Vec<u8>),
    /// Completed with a permanent failure
    Rejected(String),
}

impl PromiseState {
    pub fn is_completed(&self) -> bool {
        !matches!(self, PromiseState::Pending)
    }
}

/// A durable promise record
#[derive(Debug, Clone)]
pub struct Promise {
    pub id: String,
    pub state: PromiseState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// In-memory promise store shared by a workflow run and its engine
///
/// Cheap to clone; all clones observe the same promises.
#[derive(Clone, Default)]
pub struct PromiseStore {
    inner: Arc<Mutex<HashMap<String, Promise>>>,
}

impl PromiseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the promise if absent and return its current state
    pub fn ensure(&self, id: &str) -> PromiseState {
        let mut promises = self.inner.lock().unwrap();
        promises
            .entry(id.to_string())
            .or_insert_with(|| Promise {
                id: id.to_string(),
                state: PromiseState::Pending,
                created_at: chrono::Utc::now(),
                completed_at: None,
            })
            .state
            .clone()
    }

    /// Resolve a pending promise; returns false if it was already completed
    pub fn resolve(&self, id: &str, result: Vec<u8>) -> bool {
        self.complete(id, PromiseState::Resolved(result))
    }

    /// Reject a pending promise; returns false if it was already completed
    pub fn reject(&self, id: &str, reason: impl Into<String>) -> bool {
        self.complete(id, PromiseState::Rejected(reason.into()))
    }

    // First writer wins; a completed promise is never overwritten.
    fn complete(&self, id: &str, state: PromiseState) -> bool {
        let mut promises = self.inner.lock().unwrap();
        let promise = promises.entry(id.to_string()).or_insert_with(|| Promise {
            id: id.to_string(),
            state: PromiseState::Pending,
            created_at: chrono::Utc::now(),
            completed_at: None,
        });
        if promise.state.is_completed() {
            return false;
        }
        promise.state = state;
        promise.completed_at = Some(chrono::Utc::now());
        true
    }

    pub fn get(&self, id: &str) -> Option<Promise> {
        self.inner.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_creates_pending_once() {
        let store = PromiseStore::new();
        assert_eq!(store.ensure("p1"), PromiseState::Pending);
        assert!(store.resolve("p1", b"42".to_vec()));
        assert_eq!(store.ensure("p1"), PromiseState::Resolved(b"42".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn completion_is_first_writer_wins() {
        let store = PromiseStore::new();
        store.ensure("p1");
        assert!(store.resolve("p1", b"first".to_vec()));
        assert!(!store.resolve("p1", b"second".to_vec()));
        assert!(!store.reject("p1", "too late"));
        assert_eq!(
            store.get("p1").unwrap().state,
            PromiseState::Resolved(b"first".to_vec())
        );
    }

    #[test]
    fn reject_records_reason() {
        let store = PromiseStore::new();
        assert!(store.reject("p2", "boom"));
        assert_eq!(store.ensure("p2"), PromiseState::Rejected("boom".into()));
        assert!(store.get("p2").unwrap().completed_at.is_some());
    }

    #[test]
    fn clones_share_state() {
        let store = PromiseStore::new();
        let other = store.clone();
        store.resolve("p3", b"shared".to_vec());
        assert_eq!(other.ensure("p3"), PromiseState::Resolved(b"shared".to_vec()));
    }
}
