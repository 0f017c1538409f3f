use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{episode_order, EpisodeIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    /// The site's default listings.
    #[default]
    English,
    German,
}

impl Language {
    /// Whether a quality marker text is acceptable for this language.
    pub fn accepts(self, marker: &str) -> bool {
        match self {
            Language::English => true,
            Language::German => marker.to_lowercase().contains("german"),
        }
    }
}

/// Sync settings, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    pub only_latest_episodes: bool,
    pub language: Language,
    pub preferred_hoster: String,
}

/// Episodes a show already has in the media library, ascending by (season, episode).
///
/// Ordering is taken as reported by the library; it is not re-validated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExistingLibraryState {
    pub episode_entries: Vec<EpisodeIdentity>,
}

impl ExistingLibraryState {
    pub fn new(episode_entries: Vec<EpisodeIdentity>) -> Self {
        Self { episode_entries }
    }

    pub fn latest(&self) -> Option<&EpisodeIdentity> {
        self.episode_entries.last()
    }

    pub fn contains(&self, identity: &EpisodeIdentity) -> bool {
        self.episode_entries.iter().any(|entry| entry == identity)
    }

    pub fn is_empty(&self) -> bool {
        self.episode_entries.is_empty()
    }
}

/// Decides whether a discovered episode becomes a download candidate.
///
/// Only-latest mode emits strictly newer episodes than the library's latest one;
/// with no latest episode every discovered episode counts as new.
/// Full-catalog mode emits anything the library does not already hold.
pub fn should_emit(
    identity: &EpisodeIdentity,
    library: &ExistingLibraryState,
    policy: &SyncPolicy,
) -> bool {
    if policy.only_latest_episodes {
        match library.latest() {
            Some(latest) => episode_order(identity, latest) == Ordering::Greater,
            None => true,
        }
    } else {
        !library.contains(identity)
    }
}
