use std::time::Duration;

use reqwest::header::ACCEPT;
use scout_core::EpisodeIdentity;
use scout_logging::scout_debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("library request failed: {0}")]
    Request(#[from] FetchError),
    #[error("library response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("library section {0:?} not found")]
    SectionNotFound(String),
    #[error("show {0:?} not found in the library")]
    ShowNotFound(String),
}

/// Media library lookups needed by the catalog driver.
#[async_trait::async_trait]
pub trait LibraryClient: Send + Sync {
    /// Episodes of `show_name` already in the library, ascending by (season, episode).
    /// An empty list is a valid answer.
    async fn existing_episodes(&self, show_name: &str) -> Result<Vec<EpisodeIdentity>, LibraryError>;
}

#[derive(Debug, Clone)]
pub struct PlexSettings {
    pub base_url: String,
    pub token: String,
    pub tv_library: String,
    pub request_timeout: Duration,
}

/// Plex Media Server over its JSON HTTP API, authenticated by a pre-issued token.
pub struct PlexLibrary {
    client: reqwest::Client,
    settings: PlexSettings,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Deserialize)]
struct SectionList {
    #[serde(rename = "Directory", default)]
    directories: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    key: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct MetadataList {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<Metadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default)]
    rating_key: String,
    #[serde(default)]
    title: String,
    parent_index: Option<u32>,
    index: Option<u32>,
}

impl PlexLibrary {
    pub fn new(settings: PlexSettings) -> Result<Self, LibraryError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(FetchError::from)?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> Result<Url, LibraryError> {
        let base = Url::parse(&self.settings.base_url)
            .map_err(|err| FetchError::invalid_url(&self.settings.base_url, err))?;
        base.join(path)
            .map_err(|err| FetchError::invalid_url(path, err).into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, LibraryError> {
        scout_debug!("Library GET {}", url.path());
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header("X-Plex-Token", self.settings.token.as_str())
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            }
            .into());
        }
        let body = response.bytes().await.map_err(FetchError::from)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn section_key(&self) -> Result<String, LibraryError> {
        let sections: Envelope<SectionList> = self.get_json(self.endpoint("library/sections")?).await?;
        sections
            .media_container
            .directories
            .into_iter()
            .find(|section| section.title == self.settings.tv_library)
            .map(|section| section.key)
            .ok_or_else(|| LibraryError::SectionNotFound(self.settings.tv_library.clone()))
    }

    async fn show_key(&self, section: &str, show_name: &str) -> Result<String, LibraryError> {
        let mut url = self.endpoint(&format!("library/sections/{section}/all"))?;
        url.query_pairs_mut()
            .append_pair("type", "2")
            .append_pair("title", show_name);
        let shows: Envelope<MetadataList> = self.get_json(url).await?;
        shows
            .media_container
            .metadata
            .into_iter()
            .find(|show| show.title == show_name)
            .map(|show| show.rating_key)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LibraryError::ShowNotFound(show_name.to_string()))
    }
}

#[async_trait::async_trait]
impl LibraryClient for PlexLibrary {
    async fn existing_episodes(&self, show_name: &str) -> Result<Vec<EpisodeIdentity>, LibraryError> {
        let section = self.section_key().await?;
        let show = self.show_key(&section, show_name).await?;
        let leaves: Envelope<MetadataList> = self
            .get_json(self.endpoint(&format!("library/metadata/{show}/allLeaves"))?)
            .await?;

        let episodes: Vec<EpisodeIdentity> = leaves
            .media_container
            .metadata
            .into_iter()
            .filter_map(|leaf| Some(EpisodeIdentity::new(show_name, leaf.parent_index?, leaf.index?)))
            .collect();
        scout_debug!("{} has {} episode(s) in the library", show_name, episodes.len());
        Ok(episodes)
    }
}
