use std::collections::HashSet;
use std::fmt;

use scout_logging::{scout_debug, scout_info, scout_warn};
use url::Url;

use crate::{
    aggregate_episodes, extract_releases, should_emit, DownloadableEpisode, ExistingLibraryState,
    ListingLayout, PageQuery, SyncPolicy,
};

/// Upper bound on listing pages visited per show when none is configured.
pub const DEFAULT_MAX_PAGES: usize = 50;

/// Why a show's pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlStop {
    /// The last page had no "next" link.
    NoNextLink,
    /// The "next" link could not be turned into an absolute URL.
    InvalidNextLink { href: String },
    PageLimit { max_pages: usize },
    /// The "next" link pointed back to an already visited page.
    Cycle { url: String },
    FetchFailed { url: String, reason: String },
    Cancelled,
}

impl CrawlStop {
    pub fn is_failure(&self) -> bool {
        matches!(self, CrawlStop::FetchFailed { .. })
    }
}

impl fmt::Display for CrawlStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlStop::NoNextLink => write!(f, "no next page"),
            CrawlStop::InvalidNextLink { href } => write!(f, "unusable next link {href:?}"),
            CrawlStop::PageLimit { max_pages } => write!(f, "page limit of {max_pages} reached"),
            CrawlStop::Cycle { url } => write!(f, "next link cycles back to {url}"),
            CrawlStop::FetchFailed { url, reason } => write!(f, "fetching {url} failed: {reason}"),
            CrawlStop::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Fetching { url: String },
    Done(CrawlStop),
}

pub enum CrawlMsg<'a, P: PageQuery> {
    /// Begin at the show's catalog entry page.
    Start { entry_url: String },
    /// The page requested by the last `FetchPage` effect arrived. `final_url` is
    /// where redirects ended; relative links on the page resolve against it.
    PageLoaded {
        url: String,
        final_url: String,
        page: &'a P,
    },
    FetchFailed { url: String, reason: String },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEffect {
    FetchPage { url: String },
    Emit(DownloadableEpisode),
    Finished(CrawlStop),
}

/// Per-show pagination state. Owns the show's library snapshot for the whole crawl.
#[derive(Debug, Clone)]
pub struct ShowCrawl {
    show_name: String,
    library: ExistingLibraryState,
    policy: SyncPolicy,
    layout: ListingLayout,
    max_pages: usize,
    phase: CrawlPhase,
    visited: HashSet<String>,
    pages_processed: usize,
    emitted: usize,
}

impl ShowCrawl {
    pub fn new(
        show_name: impl Into<String>,
        library: ExistingLibraryState,
        policy: SyncPolicy,
        layout: ListingLayout,
    ) -> Self {
        Self {
            show_name: show_name.into(),
            library,
            policy,
            layout,
            max_pages: DEFAULT_MAX_PAGES,
            phase: CrawlPhase::Idle,
            visited: HashSet::new(),
            pages_processed: 0,
            emitted: 0,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn show_name(&self) -> &str {
        &self.show_name
    }

    pub fn library(&self) -> &ExistingLibraryState {
        &self.library
    }

    pub fn phase(&self) -> &CrawlPhase {
        &self.phase
    }

    pub fn pages_processed(&self) -> usize {
        self.pages_processed
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, CrawlPhase::Done(_))
    }

    fn finish(&mut self, stop: CrawlStop) -> CrawlEffect {
        self.phase = CrawlPhase::Done(stop.clone());
        CrawlEffect::Finished(stop)
    }

    fn request(&mut self, url: String) -> CrawlEffect {
        self.visited.insert(url.clone());
        self.phase = CrawlPhase::Fetching { url: url.clone() };
        CrawlEffect::FetchPage { url }
    }

    fn awaiting(&self, url: &str) -> bool {
        matches!(&self.phase, CrawlPhase::Fetching { url: pending } if pending == url)
    }
}

/// Pure update function: applies a message to a show's crawl and returns the effects
/// to carry out, in order.
///
/// Emits for one page always precede the request for the next page.
pub fn update<P: PageQuery>(mut crawl: ShowCrawl, msg: CrawlMsg<'_, P>) -> (ShowCrawl, Vec<CrawlEffect>) {
    let effects = match msg {
        CrawlMsg::Start { entry_url } => {
            if crawl.phase != CrawlPhase::Idle {
                return (crawl, Vec::new());
            }
            if crawl.policy.only_latest_episodes && crawl.library.is_empty() {
                scout_warn!(
                    "{}: library has no episodes, every discovered episode counts as new",
                    crawl.show_name
                );
            }
            let url = normalize(&entry_url);
            vec![crawl.request(url)]
        }
        CrawlMsg::PageLoaded {
            url,
            final_url,
            page,
        } => {
            if !crawl.awaiting(&url) {
                return (crawl, Vec::new());
            }
            let base = normalize(&final_url);
            crawl.visited.insert(base.clone());
            crawl.pages_processed += 1;
            let mut effects = decide_page(&mut crawl, page);
            effects.push(next_step(&mut crawl, &base, page));
            effects
        }
        CrawlMsg::FetchFailed { url, reason } => {
            if !crawl.awaiting(&url) {
                return (crawl, Vec::new());
            }
            vec![crawl.finish(CrawlStop::FetchFailed { url, reason })]
        }
        CrawlMsg::Cancelled => {
            if crawl.is_done() {
                return (crawl, Vec::new());
            }
            vec![crawl.finish(CrawlStop::Cancelled)]
        }
    };

    (crawl, effects)
}

fn decide_page<P: PageQuery>(crawl: &mut ShowCrawl, page: &P) -> Vec<CrawlEffect> {
    let releases = extract_releases(page, &crawl.layout, &crawl.policy);
    let episodes = aggregate_episodes(releases, &crawl.show_name);
    let found = episodes.len();

    let effects: Vec<CrawlEffect> = episodes
        .into_iter()
        .filter(|episode| should_emit(&episode.identity, &crawl.library, &crawl.policy))
        .map(CrawlEffect::Emit)
        .collect();
    crawl.emitted += effects.len();

    scout_debug!(
        "{}: page {} listed {} episode(s), {} new",
        crawl.show_name,
        crawl.pages_processed,
        found,
        effects.len()
    );
    effects
}

fn next_step<P: PageQuery>(crawl: &mut ShowCrawl, current_url: &str, page: &P) -> CrawlEffect {
    let href = page
        .select(&crawl.layout.next_page_selector)
        .into_iter()
        .find_map(|node| page.attr(node, "href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let Some(href) = href else {
        scout_info!(
            "{}: pagination exhausted after {} page(s)",
            crawl.show_name,
            crawl.pages_processed
        );
        return crawl.finish(CrawlStop::NoNextLink);
    };

    let Some(next_url) = resolve_link(&href, current_url) else {
        scout_warn!("{}: cannot resolve next link {:?}", crawl.show_name, href);
        return crawl.finish(CrawlStop::InvalidNextLink { href });
    };

    if crawl.visited.contains(&next_url) {
        scout_warn!("{}: next link {} was already visited", crawl.show_name, next_url);
        return crawl.finish(CrawlStop::Cycle { url: next_url });
    }
    if crawl.pages_processed >= crawl.max_pages {
        scout_warn!(
            "{}: stopping at page limit {} with more pages listed",
            crawl.show_name,
            crawl.max_pages
        );
        return crawl.finish(CrawlStop::PageLimit {
            max_pages: crawl.max_pages,
        });
    }

    crawl.request(next_url)
}

fn resolve_link(href: &str, base: &str) -> Option<String> {
    if let Ok(url) = Url::parse(href) {
        return Some(url.into());
    }
    Url::parse(base)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(Into::into)
}

fn normalize(url: &str) -> String {
    let trimmed = url.trim();
    Url::parse(trimmed)
        .map(Into::into)
        .unwrap_or_else(|_| trimmed.to_string())
}
