use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::Movie;
use crate::store::{load_json, save_json, KeyValueStore, FAVORITES_KEY};

/// Favorited movies in the order they were added, one entry per id.
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    movies: Mutex<Vec<Movie>>,
}

impl FavoritesStore {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let stored: Vec<Movie> = load_json(store.as_ref(), FAVORITES_KEY)
            .await
            .unwrap_or_default();
        let movies = dedupe_by_id(stored);
        info!("Loaded {} favorites", movies.len());
        Self {
            store,
            movies: Mutex::new(movies),
        }
    }

    /// Returns `false` when the id was already a favorite.
    pub async fn add(&self, movie: Movie) -> bool {
        let mut movies = self.movies.lock().await;
        if movies.iter().any(|m| m.id == movie.id) {
            return false;
        }
        debug!("Adding favorite {} ({})", movie.id, movie.title);
        movies.push(movie);
        save_json(self.store.as_ref(), FAVORITES_KEY, movies.as_slice()).await;
        true
    }

    /// Returns `false` when the id was not a favorite.
    pub async fn remove(&self, id: &str) -> bool {
        let mut movies = self.movies.lock().await;
        let before = movies.len();
        movies.retain(|m| m.id != id);
        if movies.len() == before {
            return false;
        }
        debug!("Removed favorite {}", id);
        save_json(self.store.as_ref(), FAVORITES_KEY, movies.as_slice()).await;
        true
    }

    /// Adds the movie if absent, removes it otherwise. Returns the new membership.
    pub async fn toggle(&self, movie: Movie) -> bool {
        let mut movies = self.movies.lock().await;
        let added = match movies.iter().position(|m| m.id == movie.id) {
            Some(index) => {
                debug!("Removed favorite {}", movie.id);
                movies.remove(index);
                false
            }
            None => {
                debug!("Adding favorite {} ({})", movie.id, movie.title);
                movies.push(movie);
                true
            }
        };
        save_json(self.store.as_ref(), FAVORITES_KEY, movies.as_slice()).await;
        added
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        self.movies.lock().await.iter().any(|m| m.id == id)
    }

    pub async fn list(&self) -> Vec<Movie> {
        self.movies.lock().await.clone()
    }

    pub async fn ids(&self) -> HashSet<String> {
        self.movies
            .lock()
            .await
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }
}

fn dedupe_by_id(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    movies
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}
