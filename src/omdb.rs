use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::models::{Movie, MovieDetail, Rating, SearchOutcome, NO_POSTER};

pub const OMDB_BASE: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[async_trait]
pub trait OmdbApi: Send + Sync {
    async fn search(&self, term: &str, page: u32) -> Result<SearchOutcome>;
    async fn fetch_details(&self, imdb_id: &str) -> Result<MovieDetail>;
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let user_agent = format!("cinefind/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .user_agent(user_agent)
            .build()
            .context("Failed to build OMDb HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.omdb_base_url.clone(), config.omdb_api_key.clone())
    }

    pub fn search_url(&self, term: &str, page: u32) -> String {
        format!(
            "{}?apikey={}&s={}&type=movie&page={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(term),
            page
        )
    }

    pub fn detail_url(&self, imdb_id: &str) -> String {
        format!(
            "{}?apikey={}&i={}&plot=full",
            self.base_url,
            self.api_key,
            urlencoding::encode(imdb_id)
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("OMDb HTTP error (status {}): {}", status, text));
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn search(&self, term: &str, page: u32) -> Result<SearchOutcome> {
        let url = self.search_url(term, page);
        let data: SearchResponse = self
            .get_json(&url)
            .await
            .with_context(|| format!("OMDb search for '{}' page {} failed", term, page))?;
        Ok(data.into_outcome())
    }

    async fn fetch_details(&self, imdb_id: &str) -> Result<MovieDetail> {
        let url = self.detail_url(imdb_id);
        let data: DetailResponse = self
            .get_json(&url)
            .await
            .with_context(|| format!("OMDb detail lookup for '{}' failed", imdb_id))?;
        Ok(data.into_detail(imdb_id))
    }
}

fn is_true(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Option<Vec<Movie>>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

impl SearchResponse {
    fn into_outcome(self) -> SearchOutcome {
        if is_true(&self.response) {
            SearchOutcome::Found(self.search.unwrap_or_default())
        } else {
            debug!("OMDb search returned no results: {:?}", self.error);
            SearchOutcome::NotFound(self.error)
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatingEntry {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: Option<String>,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Rated", default)]
    rated: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Ratings", default)]
    ratings: Vec<RatingEntry>,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
}

impl DetailResponse {
    fn into_detail(self, requested_id: &str) -> MovieDetail {
        if !is_true(&self.response) {
            debug!(
                "OMDb has no record for {}: {:?}",
                requested_id, self.error
            );
            return MovieDetail::not_found(requested_id);
        }
        MovieDetail {
            id: self.imdb_id.unwrap_or_else(|| requested_id.to_string()),
            title: self.title,
            year: self.year,
            poster: self.poster.unwrap_or_else(|| NO_POSTER.to_string()),
            kind: self.kind,
            rated: self.rated,
            runtime: self.runtime,
            plot: self.plot,
            actors_csv: self.actors,
            rating: self.imdb_rating,
            ratings: self
                .ratings
                .into_iter()
                .map(|r| Rating {
                    source: r.source,
                    value: r.value,
                })
                .collect(),
            found: true,
        }
    }
}

pub fn parse_imdb_id(input: &str) -> Option<String> {
    let lower = input.trim().to_lowercase();
    if lower.starts_with("tt") && lower.len() > 2 && lower[2..].chars().all(|c| c.is_ascii_digit())
    {
        return Some(lower);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> OmdbClient {
        OmdbClient::new("https://omdb.test/", "key123").expect("client")
    }

    #[test]
    fn search_url_encodes_term_and_filters_movies() {
        assert_eq!(
            client().search_url("Star Wars & co", 2),
            "https://omdb.test/?apikey=key123&s=Star%20Wars%20%26%20co&type=movie&page=2"
        );
    }

    #[test]
    fn detail_url_requests_full_plot() {
        assert_eq!(
            client().detail_url("tt0372784"),
            "https://omdb.test/?apikey=key123&i=tt0372784&plot=full"
        );
    }

    #[test]
    fn false_search_response_is_not_found() {
        let data: SearchResponse = serde_json::from_value(json!({
            "Response": "False",
            "Error": "Movie not found!"
        }))
        .expect("search deserialize");
        assert_eq!(
            data.into_outcome(),
            SearchOutcome::NotFound(Some("Movie not found!".to_string()))
        );
    }

    #[test]
    fn true_search_response_without_rows_is_empty_page() {
        let data: SearchResponse =
            serde_json::from_value(json!({ "Response": "True" })).expect("search deserialize");
        assert_eq!(data.into_outcome(), SearchOutcome::Found(Vec::new()));
    }

    #[test]
    fn detail_maps_ratings_in_order() {
        let data: DetailResponse = serde_json::from_value(json!({
            "Response": "True",
            "imdbID": "tt0372784",
            "Title": "Batman Begins",
            "Year": "2005",
            "Rated": "PG-13",
            "Runtime": "140 min",
            "Plot": "After witnessing his parents' death...",
            "Actors": "Christian Bale, Michael Caine",
            "imdbRating": "8.2",
            "Ratings": [
                { "Source": "Internet Movie Database", "Value": "8.2/10" },
                { "Source": "Rotten Tomatoes", "Value": "85%" }
            ],
            "Poster": "N/A",
            "Director": "Christopher Nolan"
        }))
        .expect("detail deserialize");
        let detail = data.into_detail("tt0372784");
        assert!(detail.found);
        assert_eq!(detail.rating, "8.2");
        assert_eq!(detail.ratings.len(), 2);
        assert_eq!(detail.ratings[1].source, "Rotten Tomatoes");
        assert_eq!(detail.poster_url(), None);
    }

    #[test]
    fn detail_false_response_is_not_found() {
        let data: DetailResponse = serde_json::from_value(json!({
            "Response": "False",
            "Error": "Incorrect IMDb ID."
        }))
        .expect("detail deserialize");
        let detail = data.into_detail("tt0000000");
        assert!(!detail.found);
        assert_eq!(detail.id, "tt0000000");
    }

    #[test]
    fn parses_imdb_ids_only() {
        assert_eq!(parse_imdb_id(" TT0372784 "), Some("tt0372784".to_string()));
        assert_eq!(parse_imdb_id("tt"), None);
        assert_eq!(parse_imdb_id("3"), None);
        assert_eq!(parse_imdb_id("batman"), None);
    }
}
