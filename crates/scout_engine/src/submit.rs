use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use scout_core::DownloadableEpisode;
use scout_logging::scout_info;
use serde::Serialize;
use url::Url;

use crate::FetchError;

/// A queueing request for the download manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub show_name: String,
    pub release_title: String,
    pub download_link: String,
    pub destination_hint: String,
}

impl DownloadRequest {
    /// Request for the episode's best release, filed under `{destination_root}/{show}`.
    pub fn for_episode(episode: &DownloadableEpisode, destination_root: &str) -> Option<Self> {
        let best = episode.best()?;
        let show_name = episode.identity.show_name.clone();
        Some(Self {
            destination_hint: format!("{}/{}", destination_root.trim_end_matches('/'), show_name),
            show_name,
            release_title: best.release_title.clone(),
            download_link: best.download_link.clone(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("download manager unreachable: {0}")]
    Request(#[from] FetchError),
    #[error("download manager rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not record request: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
pub trait DownloadSubmitter: Send + Sync {
    async fn submit(&self, request: &DownloadRequest) -> Result<(), SubmissionError>;
}

#[derive(Debug, Clone)]
pub struct JDownloaderSettings {
    pub api_url: String,
    pub autostart: bool,
    pub extract_password: Option<String>,
    pub request_timeout: Duration,
}

/// Link-grabber payload understood by JDownloader's local API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddLinksQuery<'a> {
    autostart: bool,
    links: &'a str,
    package_name: &'a str,
    destination_folder: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    extract_password: Option<&'a str>,
    priority: &'static str,
    overwrite_packagizer_rules: bool,
}

/// Queues downloads in a locally reachable JDownloader instance.
pub struct JDownloaderSubmitter {
    client: reqwest::Client,
    settings: JDownloaderSettings,
}

impl JDownloaderSubmitter {
    pub fn new(settings: JDownloaderSettings) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(FetchError::from)?;
        Ok(Self { client, settings })
    }

    fn add_links_url(&self) -> Result<Url, FetchError> {
        let base = Url::parse(&self.settings.api_url)
            .map_err(|err| FetchError::invalid_url(&self.settings.api_url, err))?;
        base.join("linkgrabberv2/addLinks")
            .map_err(|err| FetchError::invalid_url(&self.settings.api_url, err))
    }
}

#[async_trait::async_trait]
impl DownloadSubmitter for JDownloaderSubmitter {
    async fn submit(&self, request: &DownloadRequest) -> Result<(), SubmissionError> {
        let query = AddLinksQuery {
            autostart: self.settings.autostart,
            links: &request.download_link,
            package_name: &request.release_title,
            destination_folder: &request.destination_hint,
            extract_password: self.settings.extract_password.as_deref(),
            priority: "DEFAULT",
            overwrite_packagizer_rules: true,
        };
        let body = serde_json::to_vec(&query)?;

        let response = self
            .client
            .post(self.add_links_url()?)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(240).collect(),
            });
        }

        scout_info!("Queued {} for {}", request.release_title, request.show_name);
        Ok(())
    }
}
