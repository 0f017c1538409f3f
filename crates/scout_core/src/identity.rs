use std::cmp::Ordering;
use std::fmt;

/// The (show, season, episode) key naming one episode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeIdentity {
    pub show_name: String,
    pub season: u32,
    pub episode: u32,
}

impl EpisodeIdentity {
    pub fn new(show_name: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            show_name: show_name.into(),
            season,
            episode,
        }
    }
}

impl fmt::Display for EpisodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} S{:02}E{:02}", self.show_name, self.season, self.episode)
    }
}

/// Orders two episodes by (season, episode). The show name does not take part.
pub fn episode_order(a: &EpisodeIdentity, b: &EpisodeIdentity) -> Ordering {
    (a.season, a.episode).cmp(&(b.season, b.episode))
}
