use std::pin::pin;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use scout_core::{
    CrawlStop, EpisodeIdentity, ExistingLibraryState, ListingLayout, ShowCrawl, SyncPolicy,
    DEFAULT_MAX_PAGES,
};
use scout_logging::{scout_info, scout_warn};
use tokio_util::sync::CancellationToken;

use crate::stream::{episode_stream, CrawlItem};
use crate::{
    resolve_show_link, CatalogEvent, DecodeError, DecodedPage, DownloadRequest, DownloadSubmitter,
    FetchError, Fetcher, HtmlPage, IndexError, LibraryClient, LibraryError, LogProgressSink,
    ProgressSink, SubmissionError,
};

/// A configured show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowEntry {
    pub name: String,
    /// Catalog entry page; when absent it is looked up on the show index.
    pub catalog_link: Option<String>,
}

impl ShowEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_link: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub index_url: String,
    pub policy: SyncPolicy,
    pub layout: ListingLayout,
    pub max_pages: usize,
    pub max_concurrent_shows: usize,
    /// Download manager folder under which each show gets its own directory.
    pub destination_root: String,
}

impl CatalogSettings {
    pub fn new(index_url: impl Into<String>, policy: SyncPolicy, destination_root: impl Into<String>) -> Self {
        Self {
            index_url: index_url.into(),
            policy,
            layout: ListingLayout::default(),
            max_pages: DEFAULT_MAX_PAGES,
            max_concurrent_shows: 4,
            destination_root: destination_root.into(),
        }
    }
}

/// Why a single show could not be processed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("show index unavailable: {0}")]
    IndexFetch(FetchError),
    #[error("show index unreadable: {0}")]
    IndexDecode(DecodeError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("crawl aborted: {0}")]
    Crawl(CrawlStop),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[derive(Debug)]
pub enum ShowOutcome {
    Completed(CrawlStop),
    Failed(CatalogError),
}

#[derive(Debug)]
pub struct ShowReport {
    pub show: String,
    pub pages: usize,
    pub submitted: Vec<EpisodeIdentity>,
    pub outcome: ShowOutcome,
}

impl ShowReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ShowOutcome::Failed(_))
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub shows: Vec<ShowReport>,
}

impl RunSummary {
    pub fn failed(&self) -> impl Iterator<Item = &ShowReport> {
        self.shows.iter().filter(|report| report.is_failed())
    }

    pub fn submitted_count(&self) -> usize {
        self.shows.iter().map(|report| report.submitted.len()).sum()
    }
}

/// Runs every configured show through its own crawl and forwards new episodes
/// to the download manager. A show's failure never affects the others.
pub struct CatalogDriver {
    settings: CatalogSettings,
    fetcher: Arc<dyn Fetcher>,
    library: Arc<dyn LibraryClient>,
    submitter: Arc<dyn DownloadSubmitter>,
    sink: Arc<dyn ProgressSink>,
}

impl CatalogDriver {
    pub fn new(
        settings: CatalogSettings,
        fetcher: Arc<dyn Fetcher>,
        library: Arc<dyn LibraryClient>,
        submitter: Arc<dyn DownloadSubmitter>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            library,
            submitter,
            sink: Arc::new(LogProgressSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub async fn run(&self, shows: &[ShowEntry], cancel: &CancellationToken) -> RunSummary {
        let links = self.resolve_links(shows).await;
        let reports = stream::iter(shows.iter().zip(links))
            .map(|(show, link)| self.run_show(show, link, cancel.child_token()))
            .buffered(self.settings.max_concurrent_shows.max(1))
            .collect::<Vec<_>>()
            .await;

        RunSummary { shows: reports }
    }

    /// Entry page per show, in the order of `shows`. The index is fetched at
    /// most once and only when some show has no configured link.
    async fn resolve_links(&self, shows: &[ShowEntry]) -> Vec<Result<String, CatalogError>> {
        if shows.iter().all(|show| show.catalog_link.is_some()) {
            return shows
                .iter()
                .filter_map(|show| show.catalog_link.clone())
                .map(Ok)
                .collect();
        }

        let index_url = self.settings.index_url.as_str();
        scout_info!("Looking up shows on {}", index_url);
        let index = match self.fetcher.fetch(index_url).await {
            Ok(fetched) => DecodedPage::from_fetch(&fetched)
                .map(|decoded| (fetched.final_url, decoded))
                .map_err(CatalogError::IndexDecode),
            Err(err) => Err(CatalogError::IndexFetch(err)),
        };
        // Index links are relative to wherever the index request was redirected.
        let page = match &index {
            Ok((base, decoded)) => Some((base.as_str(), HtmlPage::parse(&decoded.html))),
            Err(err) => {
                scout_warn!("Show index unavailable: {}", err);
                None
            }
        };

        shows
            .iter()
            .map(|show| match (&show.catalog_link, &page, &index) {
                (Some(link), _, _) => Ok(link.clone()),
                (None, Some((base, page)), _) => {
                    resolve_show_link(page, base, &show.name).map_err(CatalogError::from)
                }
                (None, None, Err(CatalogError::IndexDecode(err))) => {
                    Err(CatalogError::IndexDecode(err.clone()))
                }
                (None, None, Err(CatalogError::IndexFetch(err))) => {
                    Err(CatalogError::IndexFetch(err.clone()))
                }
                (None, None, _) => Err(IndexError::ShowNotListed(show.name.clone()).into()),
            })
            .collect()
    }

    async fn run_show(
        &self,
        show: &ShowEntry,
        link: Result<String, CatalogError>,
        cancel: CancellationToken,
    ) -> ShowReport {
        self.sink.emit(CatalogEvent::ShowStarted {
            show: show.name.clone(),
        });
        let mut report = ShowReport {
            show: show.name.clone(),
            pages: 0,
            submitted: Vec::new(),
            outcome: ShowOutcome::Completed(CrawlStop::NoNextLink),
        };

        match self.crawl_show(show, link, cancel, &mut report).await {
            Ok(stop) => {
                self.sink.emit(CatalogEvent::ShowFinished {
                    show: show.name.clone(),
                    pages: report.pages,
                    submitted: report.submitted.len(),
                    stop: stop.clone(),
                });
                report.outcome = ShowOutcome::Completed(stop);
            }
            Err(err) => {
                self.sink.emit(CatalogEvent::ShowFailed {
                    show: show.name.clone(),
                    error: err.to_string(),
                });
                report.outcome = ShowOutcome::Failed(err);
            }
        }
        report
    }

    async fn crawl_show(
        &self,
        show: &ShowEntry,
        link: Result<String, CatalogError>,
        cancel: CancellationToken,
        report: &mut ShowReport,
    ) -> Result<CrawlStop, CatalogError> {
        let entry_url = link?;
        if cancel.is_cancelled() {
            return Ok(CrawlStop::Cancelled);
        }

        let existing = self.library.existing_episodes(&show.name).await?;
        let crawl = ShowCrawl::new(
            show.name.as_str(),
            ExistingLibraryState::new(existing),
            self.settings.policy.clone(),
            self.settings.layout.clone(),
        )
        .with_max_pages(self.settings.max_pages);

        let mut items = pin!(episode_stream(self.fetcher.as_ref(), crawl, &entry_url, cancel));
        while let Some(item) = items.next().await {
            match item {
                CrawlItem::Episode(episode) => {
                    let Some(request) =
                        DownloadRequest::for_episode(&episode, &self.settings.destination_root)
                    else {
                        continue;
                    };
                    self.submitter.submit(&request).await?;
                    self.sink.emit(CatalogEvent::CandidateSubmitted {
                        identity: episode.identity.clone(),
                        release_title: request.release_title,
                    });
                    report.submitted.push(episode.identity);
                }
                CrawlItem::Finished { stop, pages, .. } => {
                    report.pages = pages;
                    if stop.is_failure() {
                        return Err(CatalogError::Crawl(stop));
                    }
                    return Ok(stop);
                }
            }
        }
        Ok(CrawlStop::Cancelled)
    }
}
