use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::omdb::OMDB_BASE;
use crate::theme::Theme;

pub const REQUIRED_ENV: [&str; 1] = ["OMDB_API_KEY"];

const DEFAULT_DATA_DIR: &str = ".cinefind";
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_INITIAL_QUERY: &str = "Marvel";

#[derive(Debug, Clone)]
pub struct Config {
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub data_dir: PathBuf,
    pub debounce: Duration,
    /// Color scheme reported by the host, if any.
    pub system_theme: Option<Theme>,
    pub initial_query: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let omdb_api_key = non_empty("OMDB_API_KEY").context("OMDB_API_KEY not set")?;
        let omdb_base_url = non_empty("OMDB_BASE_URL").unwrap_or_else(|| OMDB_BASE.to_string());
        let data_dir = non_empty("CINEFIND_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let debounce_ms = match non_empty("CINEFIND_DEBOUNCE_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CINEFIND_DEBOUNCE_MS is not a number: {}", raw))?,
            None => DEFAULT_DEBOUNCE_MS,
        };
        let system_theme = match non_empty("CINEFIND_SYSTEM_THEME") {
            Some(raw) => Some(raw.parse::<Theme>().context("Invalid CINEFIND_SYSTEM_THEME")?),
            None => None,
        };
        let initial_query =
            lookup("CINEFIND_INITIAL_QUERY").unwrap_or_else(|| DEFAULT_INITIAL_QUERY.to_string());

        Ok(Self {
            omdb_api_key,
            omdb_base_url,
            data_dir,
            debounce: Duration::from_millis(debounce_ms),
            system_theme,
            initial_query,
        })
    }
}
