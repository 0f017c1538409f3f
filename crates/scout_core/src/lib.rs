//! Scout core: pure catalog reconciliation (extraction, grouping, sync decisions, pagination).
mod aggregate;
mod crawl;
mod extract;
mod identity;
mod page;
mod policy;
mod release;

pub use aggregate::{aggregate_episodes, parse_season_episode};
pub use crawl::{update, CrawlEffect, CrawlMsg, CrawlPhase, CrawlStop, ShowCrawl, DEFAULT_MAX_PAGES};
pub use extract::{extract_releases, QualityTier};
pub use identity::{episode_order, EpisodeIdentity};
pub use page::{ListingLayout, PageQuery};
pub use policy::{should_emit, ExistingLibraryState, Language, SyncPolicy};
pub use release::{DownloadableEpisode, ReleaseCandidate};
