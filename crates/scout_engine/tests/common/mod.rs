//! Catalog-site HTML builders and in-memory collaborators.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use scout_core::EpisodeIdentity;
use scout_engine::{
    CatalogEvent, DownloadRequest, DownloadSubmitter, FetchError, FetchedPage, Fetcher,
    LibraryClient, LibraryError, ProgressSink, SubmissionError,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scout_logging::initialize_for_tests);
}

/// One listing block: title label, then `Download:` + link + hoster text per mirror.
pub fn release_block(title: &str, mirrors: &[(&str, &str)]) -> String {
    let mut html = format!("<p><strong>{title}</strong><br>");
    for (href, hoster) in mirrors {
        html.push_str(&format!(
            "<strong>Download:</strong> <a href=\"{href}\" target=\"_blank\">{href}</a> | {hoster}<br>"
        ));
    }
    html.push_str("</p>");
    html
}

pub fn runtime_block() -> String {
    "<p><strong>Dauer:</strong> 42 Min. | <strong>Format:</strong> 1080p</p>".to_string()
}

pub fn listing_page(blocks: &[String], next: Option<&str>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html><html><head><title>Listing</title></head><body><div class=\"post-content\">",
    );
    for block in blocks {
        html.push_str(block);
        html.push('\n');
    }
    html.push_str("</div>");
    if let Some(href) = next {
        html.push_str(&format!(
            "<div class=\"nav\"><a class=\"prev\" href=\"#\">Zurück</a> <a class=\"next\" href=\"{href}\">Weiter</a></div>"
        ));
    }
    html.push_str("</body></html>");
    html
}

pub fn index_page(shows: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><div id=\"sidebar\"><ul>");
    for (name, href) in shows {
        html.push_str(&format!("<li><a href=\"{href}\">{name}</a></li>"));
    }
    html.push_str("</ul></div></body></html>");
    html
}

/// Serves canned pages by URL; unknown URLs answer 404. Records every request.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Result<FetchedPage, FetchError>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: String) -> Self {
        self.redirected(url, url, html)
    }

    /// `url` answers with `html` as if the server had redirected to `final_url`.
    pub fn redirected(mut self, url: &str, final_url: &str, html: String) -> Self {
        self.pages.insert(
            url.to_string(),
            Ok(FetchedPage {
                body: html.into_bytes(),
                final_url: final_url.to_string(),
                content_type: Some("text/html; charset=utf-8".to_string()),
            }),
        );
        self
    }

    pub fn failing(mut self, url: &str, err: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(err));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status { status: 404 }))
    }
}

/// Library with fixed contents; shows not listed have no episodes.
#[derive(Default)]
pub struct FixedLibrary {
    shows: HashMap<String, Vec<EpisodeIdentity>>,
    unavailable: Vec<String>,
}

impl FixedLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(mut self, name: &str, episodes: &[(u32, u32)]) -> Self {
        self.shows.insert(
            name.to_string(),
            episodes
                .iter()
                .map(|(season, episode)| EpisodeIdentity::new(name, *season, *episode))
                .collect(),
        );
        self
    }

    pub fn unavailable(mut self, name: &str) -> Self {
        self.unavailable.push(name.to_string());
        self
    }
}

#[async_trait::async_trait]
impl LibraryClient for FixedLibrary {
    async fn existing_episodes(&self, show_name: &str) -> Result<Vec<EpisodeIdentity>, LibraryError> {
        if self.unavailable.iter().any(|name| name == show_name) {
            return Err(LibraryError::ShowNotFound(show_name.to_string()));
        }
        Ok(self.shows.get(show_name).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingSubmitter {
    requests: Mutex<Vec<DownloadRequest>>,
}

impl RecordingSubmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DownloadSubmitter for RecordingSubmitter {
    async fn submit(&self, request: &DownloadRequest) -> Result<(), SubmissionError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Records requests, rejecting those of the listed shows.
#[derive(Default)]
pub struct RejectingSubmitter {
    rejected_shows: Vec<String>,
    accepted: Mutex<Vec<DownloadRequest>>,
}

impl RejectingSubmitter {
    pub fn rejecting(shows: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            rejected_shows: shows.iter().map(|show| show.to_string()).collect(),
            accepted: Mutex::new(Vec::new()),
        })
    }

    pub fn accepted(&self) -> Vec<DownloadRequest> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DownloadSubmitter for RejectingSubmitter {
    async fn submit(&self, request: &DownloadRequest) -> Result<(), SubmissionError> {
        if self.rejected_shows.contains(&request.show_name) {
            return Err(SubmissionError::Rejected {
                status: 500,
                body: "link grabber unavailable".to_string(),
            });
        }
        self.accepted.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CatalogEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<CatalogEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: CatalogEvent) {
        self.events.lock().unwrap().push(event);
    }
}
