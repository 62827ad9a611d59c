use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::MovieDetail;
use crate::omdb::OmdbApi;

/// Clip behind the detail view's play button. It is the same for every movie;
/// there is no trailer lookup.
pub const PREVIEW_CLIP_URL: &str =
    "https://videos.pexels.com/video-files/18394332/18394332-hd_1920_1080_30fps.mp4";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading,
    Found(MovieDetail),
    NotFound,
    Failed,
}

impl DetailState {
    pub fn detail(&self) -> Option<&MovieDetail> {
        match self {
            DetailState::Found(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Holds the record for a single detail view.
pub struct DetailLoader {
    provider: Arc<dyn OmdbApi>,
    state: Mutex<DetailState>,
}

impl DetailLoader {
    pub fn new(provider: Arc<dyn OmdbApi>) -> Self {
        Self {
            provider,
            state: Mutex::new(DetailState::Idle),
        }
    }

    pub async fn load(&self, imdb_id: &str) -> DetailState {
        *self.state.lock().await = DetailState::Loading;
        let next = match self.provider.fetch_details(imdb_id).await {
            Ok(detail) if detail.found => DetailState::Found(detail),
            Ok(_) => {
                debug!("No details for {}", imdb_id);
                DetailState::NotFound
            }
            Err(e) => {
                warn!("Error fetching movie details for {}: {:#}", imdb_id, e);
                DetailState::Failed
            }
        };
        *self.state.lock().await = next.clone();
        next
    }

    pub async fn state(&self) -> DetailState {
        self.state.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchOutcome;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FixedDetails;

    #[async_trait]
    impl OmdbApi for FixedDetails {
        async fn search(&self, _term: &str, _page: u32) -> Result<SearchOutcome> {
            Ok(SearchOutcome::NotFound(None))
        }

        async fn fetch_details(&self, imdb_id: &str) -> Result<MovieDetail> {
            match imdb_id {
                "tt0372784" => {
                    let mut detail = MovieDetail::not_found(imdb_id);
                    detail.title = "Batman Begins".to_string();
                    detail.found = true;
                    Ok(detail)
                }
                "tt0000000" => Ok(MovieDetail::not_found(imdb_id)),
                _ => Err(anyhow!("connection reset")),
            }
        }
    }

    #[tokio::test]
    async fn distinguishes_found_missing_and_failed() {
        let loader = DetailLoader::new(Arc::new(FixedDetails));
        assert_eq!(loader.state().await, DetailState::Idle);

        let found = loader.load("tt0372784").await;
        assert_eq!(
            found.detail().map(|d| d.title.as_str()),
            Some("Batman Begins")
        );
        assert_eq!(loader.state().await, found);

        assert_eq!(loader.load("tt0000000").await, DetailState::NotFound);
        assert_eq!(loader.load("tt9999999").await, DetailState::Failed);
        assert_eq!(loader.state().await, DetailState::Failed);
    }
}
