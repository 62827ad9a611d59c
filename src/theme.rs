use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::store::{KeyValueStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow!("theme must be 'light' or 'dark'")),
        }
    }
}

/// Light/dark preference. The stored value is the bare literal, not JSON.
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
    current: Mutex<Theme>,
}

impl ThemePreference {
    /// System scheme first (or light), then any valid persisted choice on top.
    pub async fn load(store: Arc<dyn KeyValueStore>, system: Option<Theme>) -> Self {
        let mut theme = system.unwrap_or_default();
        match store.get(THEME_KEY).await {
            Ok(Some(saved)) => match saved.parse::<Theme>() {
                Ok(saved) => theme = saved,
                Err(_) => warn!("Ignoring unknown stored theme '{}'", saved.trim()),
            },
            Ok(None) => {}
            Err(e) => warn!("Failed to load theme preference: {:#}", e),
        }
        info!("Theme: {}", theme);
        Self {
            store,
            current: Mutex::new(theme),
        }
    }

    pub async fn current(&self) -> Theme {
        *self.current.lock().await
    }

    pub async fn toggle(&self) -> Theme {
        let mut current = self.current.lock().await;
        *current = current.toggled();
        if let Err(e) = self.store.set(THEME_KEY, current.as_str()).await {
            warn!("Failed to persist theme preference: {:#}", e);
        }
        *current
    }
}
