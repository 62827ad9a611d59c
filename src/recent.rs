use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::store::{load_json, save_json, KeyValueStore, RECENT_SEARCHES_KEY};

pub const MAX_RECENT_SEARCHES: usize = 5;

/// Most-recent-first search terms, unique, at most [`MAX_RECENT_SEARCHES`].
pub struct RecentSearches {
    store: Arc<dyn KeyValueStore>,
    terms: Mutex<Vec<String>>,
}

impl RecentSearches {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let stored: Vec<String> = load_json(store.as_ref(), RECENT_SEARCHES_KEY)
            .await
            .unwrap_or_default();
        // Replaying oldest-first through push_front keeps the invariant even
        // if the stored list was edited by hand.
        let mut terms = Vec::new();
        for term in stored.iter().rev() {
            push_front(&mut terms, term);
        }
        Self {
            store,
            terms: Mutex::new(terms),
        }
    }

    pub async fn add(&self, term: &str) {
        let mut terms = self.terms.lock().await;
        if !push_front(&mut terms, term) {
            return;
        }
        debug!("Recent searches: {:?}", *terms);
        save_json(self.store.as_ref(), RECENT_SEARCHES_KEY, terms.as_slice()).await;
    }

    pub async fn list(&self) -> Vec<String> {
        self.terms.lock().await.clone()
    }
}

/// Move-to-front insert with truncation. Returns `false` if nothing changed.
fn push_front(terms: &mut Vec<String>, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    if terms.first().map(String::as_str) == Some(term) {
        return false;
    }
    terms.retain(|t| t != term);
    terms.insert(0, term.to_string());
    terms.truncate(MAX_RECENT_SEARCHES);
    true
}
