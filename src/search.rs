//! Debounced title search with incremental pagination.
//!
//! The session lives in a `watch` channel and is only ever mutated through
//! synchronous closures, so every completion reads and updates the latest
//! state instead of whatever it captured when the request was issued. Each
//! reset bumps a private generation; a completion whose generation no
//! longer matches belongs to a superseded query and is dropped.
//!
//! `page` only advances past a page that was actually answered. Until page 1
//! comes back, `load_more` re-requests page 1 instead of moving on.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::connectivity::ConnectivityWatch;
use crate::debounce::Debouncer;
use crate::models::{Movie, SearchOutcome};
use crate::omdb::OmdbApi;
use crate::recent::RecentSearches;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    pub query: String,
    pub page: u32,
    pub results: Vec<Movie>,
    pub loading: bool,
    pub has_more: bool,
    /// Whether `page` has been answered for the current query.
    fetched: bool,
    generation: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            results: Vec::new(),
            loading: false,
            has_more: true,
            fetched: false,
            generation: 0,
        }
    }
}

impl SearchSession {
    fn reset(&mut self, query: String) {
        self.generation += 1;
        self.query = query;
        self.page = 1;
        self.results.clear();
        self.loading = false;
        self.has_more = true;
        self.fetched = false;
    }
}

struct PageRequest {
    query: String,
    page: u32,
    generation: u64,
}

struct Inner {
    provider: Arc<dyn OmdbApi>,
    recent: Arc<RecentSearches>,
    connectivity: ConnectivityWatch,
    session: watch::Sender<SearchSession>,
}

pub struct SearchController {
    inner: Arc<Inner>,
    debouncer: Debouncer,
}

impl SearchController {
    pub fn new(
        provider: Arc<dyn OmdbApi>,
        recent: Arc<RecentSearches>,
        connectivity: ConnectivityWatch,
        debounce: Duration,
    ) -> Self {
        let (session, _) = watch::channel(SearchSession::default());
        Self {
            inner: Arc::new(Inner {
                provider,
                recent,
                connectivity,
                session,
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Replaces the pending query. The session resets and page 1 is fetched
    /// once no further call has arrived for the debounce interval.
    pub fn set_query(&mut self, text: &str) {
        let inner = self.inner.clone();
        let query = text.trim().to_string();
        debug!("Query input '{}'", query);
        self.debouncer.schedule(async move {
            inner.start(query).await;
        });
    }

    /// Resets the session to `text` and fetches page 1 immediately.
    pub async fn search_now(&self, text: &str) {
        self.inner.start(text.trim().to_string()).await;
    }

    /// Fetches the next page unless a fetch is in flight, the last page was
    /// reached, the query is empty, or the device is offline. If page 1 was
    /// never answered it is requested again.
    pub async fn load_more(&self) {
        let connected = self.inner.connectivity.is_connected();
        let mut request = None;
        self.inner.session.send_if_modified(|s| {
            if s.loading || !s.has_more || s.query.is_empty() || !connected {
                return false;
            }
            if s.fetched {
                s.page += 1;
            }
            s.loading = true;
            request = Some(PageRequest {
                query: s.query.clone(),
                page: s.page,
                generation: s.generation,
            });
            true
        });
        match request {
            Some(request) => self.inner.fetch(request).await,
            None => debug!("load_more skipped"),
        }
    }

    pub fn session(&self) -> SearchSession {
        self.inner.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSession> {
        self.inner.session.subscribe()
    }

    pub fn has_pending_query(&self) -> bool {
        self.debouncer.is_pending()
    }
}

impl Inner {
    async fn start(&self, query: String) {
        let connected = self.connectivity.is_connected();
        let mut request = None;
        self.session.send_modify(|s| {
            s.reset(query);
            if s.query.is_empty() {
                return;
            }
            if !connected {
                debug!("Offline, not searching for '{}'", s.query);
                return;
            }
            s.loading = true;
            request = Some(PageRequest {
                query: s.query.clone(),
                page: 1,
                generation: s.generation,
            });
        });
        if let Some(request) = request {
            self.fetch(request).await;
        }
    }

    async fn fetch(&self, request: PageRequest) {
        let PageRequest {
            query,
            page,
            generation,
        } = request;
        let result = self.provider.search(&query, page).await;

        let mut first_page_found = false;
        self.session.send_if_modified(|s| {
            if s.generation != generation {
                debug!("Dropping superseded results for '{}' page {}", query, page);
                return false;
            }
            s.loading = false;
            match &result {
                Ok(SearchOutcome::Found(movies)) => {
                    info!("'{}' page {}: {} results", query, page, movies.len());
                    s.has_more = !movies.is_empty();
                    s.fetched = true;
                    if page == 1 {
                        s.results = movies.clone();
                        first_page_found = true;
                    } else {
                        s.results.extend(movies.iter().cloned());
                    }
                }
                Ok(SearchOutcome::NotFound(reason)) => {
                    debug!("'{}' page {}: no results ({:?})", query, page, reason);
                    s.has_more = false;
                    s.fetched = true;
                }
                Err(e) => {
                    warn!("Error fetching movies: {:#}", e);
                    if page > 1 {
                        s.page = page - 1;
                    }
                }
            }
            true
        });

        if first_page_found {
            self.recent.add(&query).await;
        }
    }
}
