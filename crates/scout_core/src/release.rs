use crate::EpisodeIdentity;

/// One download offering found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCandidate {
    pub release_title: String,
    pub download_link: String,
}

impl ReleaseCandidate {
    pub fn new(release_title: impl Into<String>, download_link: impl Into<String>) -> Self {
        Self {
            release_title: release_title.into(),
            download_link: download_link.into(),
        }
    }
}

/// An episode together with every release found for it on one page,
/// best release first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadableEpisode {
    pub identity: EpisodeIdentity,
    pub candidate_links: Vec<ReleaseCandidate>,
}

impl DownloadableEpisode {
    pub fn new(identity: EpisodeIdentity, first: ReleaseCandidate) -> Self {
        Self {
            identity,
            candidate_links: vec![first],
        }
    }

    /// The preferred release for this episode on its page.
    pub fn best(&self) -> Option<&ReleaseCandidate> {
        self.candidate_links.first()
    }
}
