use scout_core::{CrawlStop, EpisodeIdentity};
use scout_logging::{scout_error, scout_info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    ShowStarted {
        show: String,
    },
    CandidateSubmitted {
        identity: EpisodeIdentity,
        release_title: String,
    },
    ShowFinished {
        show: String,
        pages: usize,
        submitted: usize,
        stop: CrawlStop,
    },
    ShowFailed {
        show: String,
        error: String,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CatalogEvent);
}

/// Writes catalog progress to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: CatalogEvent) {
        match event {
            CatalogEvent::ShowStarted { show } => scout_info!("{}: crawl started", show),
            CatalogEvent::CandidateSubmitted {
                identity,
                release_title,
            } => scout_info!("{}: submitted {}", identity, release_title),
            CatalogEvent::ShowFinished {
                show,
                pages,
                submitted,
                stop,
            } => scout_info!(
                "{}: finished after {} page(s), {} candidate(s) submitted ({})",
                show,
                pages,
                submitted,
                stop
            ),
            CatalogEvent::ShowFailed { show, error } => scout_error!("{}: {}", show, error),
        }
    }
}
