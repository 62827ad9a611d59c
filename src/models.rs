use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker OMDb uses when a record has no poster.
pub const NO_POSTER: &str = "N/A";

/// A search-result row. Unknown provider fields are kept in `extra` and
/// written back out unchanged when the movie is persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Movie {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default = "no_poster")]
    pub poster: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn no_poster() -> String {
    NO_POSTER.to_string()
}

impl Movie {
    pub fn new(id: impl Into<String>, title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: year.into(),
            poster: no_poster(),
            kind: None,
            extra: Map::new(),
        }
    }

    pub fn poster_url(&self) -> Option<&str> {
        poster_url(&self.poster)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Rating {
    pub source: String,
    pub value: String,
}

/// Full record behind the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub kind: Option<String>,
    pub rated: String,
    pub runtime: String,
    pub plot: String,
    pub actors_csv: String,
    pub rating: String,
    pub ratings: Vec<Rating>,
    pub found: bool,
}

impl MovieDetail {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            year: String::new(),
            poster: no_poster(),
            kind: None,
            rated: String::new(),
            runtime: String::new(),
            plot: String::new(),
            actors_csv: String::new(),
            rating: String::new(),
            ratings: Vec::new(),
            found: false,
        }
    }

    pub fn actors(&self) -> Vec<&str> {
        self.actors_csv
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty() && *a != NO_POSTER)
            .collect()
    }

    pub fn poster_url(&self) -> Option<&str> {
        poster_url(&self.poster)
    }

    /// Search-row view of this record, used when favoriting from the detail page.
    pub fn as_movie(&self) -> Movie {
        Movie {
            id: self.id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            poster: self.poster.clone(),
            kind: self.kind.clone(),
            extra: Map::new(),
        }
    }
}

fn poster_url(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_POSTER {
        None
    } else {
        Some(trimmed)
    }
}

/// One page of search results, or the provider's "nothing (more) here".
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<Movie>),
    NotFound(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn movie_keeps_unknown_provider_fields() {
        let raw = json!({
            "Title": "Batman Begins",
            "Year": "2005",
            "imdbID": "tt0372784",
            "Type": "movie",
            "Poster": "https://m.media-amazon.com/images/batman.jpg",
            "Extra": { "nested": true }
        });
        let movie: Movie = serde_json::from_value(raw.clone()).expect("movie deserialize");
        assert_eq!(movie.id, "tt0372784");
        assert_eq!(movie.kind.as_deref(), Some("movie"));
        assert_eq!(movie.extra.get("Extra"), Some(&json!({ "nested": true })));
        assert_eq!(serde_json::to_value(&movie).expect("serialize"), raw);
    }

    #[test]
    fn poster_marker_means_no_poster() {
        let movie: Movie = serde_json::from_value(json!({
            "Title": "Obscure",
            "imdbID": "tt1",
            "Poster": "N/A"
        }))
        .expect("movie deserialize");
        assert_eq!(movie.poster_url(), None);
        assert_eq!(movie.year, "");
        assert_eq!(Movie::new("tt2", "Other", "1999").poster_url(), None);
    }

    #[test]
    fn actors_are_split_and_trimmed() {
        let mut detail = MovieDetail::not_found("tt1");
        detail.actors_csv = "Christian Bale, Michael Caine ,Liam Neeson".to_string();
        assert_eq!(
            detail.actors(),
            vec!["Christian Bale", "Michael Caine", "Liam Neeson"]
        );
        detail.actors_csv = "N/A".to_string();
        assert!(detail.actors().is_empty());
    }
}
