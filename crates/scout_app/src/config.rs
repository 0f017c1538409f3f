//! RON configuration loaded once at startup.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use scout_core::{Language, SyncPolicy, DEFAULT_MAX_PAGES};
use scout_engine::ShowEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub tv_shows: Vec<TvShowConfig>,
    pub plex: PlexConfig,
    pub jdownloader: JDownloaderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub language: Language,
    pub only_latest_episodes: bool,
    pub max_pages: usize,
    pub max_concurrent_shows: usize,
    /// Applies to catalog, library and download manager requests.
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            only_latest_episodes: true,
            max_pages: DEFAULT_MAX_PAGES,
            max_concurrent_shows: 4,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub index_url: String,
    pub hoster: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_url: "http://serienjunkies.org/serien/?cat=0&showall".to_string(),
            hoster: "share-online".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvShowConfig {
    pub name: String,
    #[serde(default)]
    pub catalog_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlexConfig {
    pub base_url: String,
    pub token: String,
    pub tv_library: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JDownloaderConfig {
    pub api_url: String,
    #[serde(default)]
    pub autostart: bool,
    pub tv_shows_dir: String,
    #[serde(default)]
    pub extract_password: Option<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            bail!("config is empty");
        }
        let config: AppConfig = ron::from_str(content)?;
        if config.tv_shows.is_empty() {
            bail!("no tv_shows configured");
        }
        Ok(config)
    }

    pub fn get_tv_shows(&self) -> Vec<ShowEntry> {
        self.tv_shows
            .iter()
            .map(|show| ShowEntry {
                name: show.name.clone(),
                catalog_link: show.catalog_link.clone(),
            })
            .collect()
    }

    pub fn get_language(&self) -> Language {
        self.general.language
    }

    pub fn get_only_latest_episodes(&self) -> bool {
        self.general.only_latest_episodes
    }

    pub fn get_preferred_hoster(&self) -> &str {
        &self.catalog.hoster
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy {
            only_latest_episodes: self.get_only_latest_episodes(),
            language: self.get_language(),
            preferred_hoster: self.get_preferred_hoster().to_string(),
        }
    }
}
