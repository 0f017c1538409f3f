use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scout_logging::scout_trace;

use crate::{DownloadableEpisode, EpisodeIdentity, ReleaseCandidate};

static SEASON_EPISODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"S(\d{2})E(\d{2})").expect("static season/episode pattern"));

/// Season and episode numbers embedded anywhere in a release title.
pub fn parse_season_episode(title: &str) -> Option<(u32, u32)> {
    let caps = SEASON_EPISODE_RE.captures(title)?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;
    Some((season, episode))
}

/// Groups releases by episode, keeping first-seen order of episodes and of
/// releases within each episode.
///
/// Titles without a season/episode marker (season packs and the like) are dropped.
pub fn aggregate_episodes(
    releases: Vec<ReleaseCandidate>,
    show_name: &str,
) -> Vec<DownloadableEpisode> {
    let mut episodes: Vec<DownloadableEpisode> = Vec::new();
    let mut index: HashMap<EpisodeIdentity, usize> = HashMap::new();

    for release in releases {
        let Some((season, episode)) = parse_season_episode(&release.release_title) else {
            scout_trace!("Discarding release without episode marker: {}", release.release_title);
            continue;
        };
        let identity = EpisodeIdentity::new(show_name, season, episode);
        match index.get(&identity) {
            Some(&pos) => episodes[pos].candidate_links.push(release),
            None => {
                index.insert(identity.clone(), episodes.len());
                episodes.push(DownloadableEpisode::new(identity, release));
            }
        }
    }

    episodes
}
