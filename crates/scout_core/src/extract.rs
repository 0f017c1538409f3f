use scout_logging::scout_trace;

use crate::{Language, ListingLayout, PageQuery, ReleaseCandidate, SyncPolicy};

/// Quality tiers accepted on listing pages, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    FullHdWebDl,
    FullHd,
    HdReadyWebDl,
    HdReady,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::FullHdWebDl,
        QualityTier::FullHd,
        QualityTier::HdReadyWebDl,
        QualityTier::HdReady,
    ];

    fn tokens(self) -> &'static [&'static str] {
        match self {
            QualityTier::FullHdWebDl => &["1080p", "WEB-DL"],
            QualityTier::FullHd => &["1080p"],
            QualityTier::HdReadyWebDl => &["720p", "WEB-DL"],
            QualityTier::HdReady => &["720p"],
        }
    }

    pub fn matches(self, marker: &str) -> bool {
        self.tokens().iter().all(|token| marker.contains(token))
    }

    /// Best tier a marker satisfies, if any.
    pub fn classify(marker: &str) -> Option<QualityTier> {
        Self::ALL.into_iter().find(|tier| tier.matches(marker))
    }
}

/// Pulls (release title, download link) pairs out of one listing page.
///
/// Blocks are visited in document order, which on the catalog site is
/// quality-ascending. The collected sequence is reversed as a whole before it
/// is returned, so the first entry for any episode is its best release.
pub fn extract_releases<P: PageQuery>(
    page: &P,
    layout: &ListingLayout,
    policy: &SyncPolicy,
) -> Vec<ReleaseCandidate> {
    let mut releases = Vec::new();
    for block in page.select(&layout.block_selector) {
        if !is_eligible_block(page, block, layout, policy.language) {
            continue;
        }
        collect_block_links(page, block, layout, &policy.preferred_hoster, &mut releases);
    }
    releases.reverse();
    releases
}

fn is_eligible_block<P: PageQuery>(
    page: &P,
    block: P::Node,
    layout: &ListingLayout,
    language: Language,
) -> bool {
    if page.text(block).contains(&layout.runtime_caption) {
        return false;
    }
    page.children(block)
        .into_iter()
        .filter(|child| page.tag(*child) == Some(layout.label_tag.as_str()))
        .map(|label| page.text(label))
        .any(|marker| QualityTier::classify(&marker).is_some() && language.accepts(&marker))
}

fn collect_block_links<P: PageQuery>(
    page: &P,
    block: P::Node,
    layout: &ListingLayout,
    hoster: &str,
    out: &mut Vec<ReleaseCandidate>,
) {
    let children = page.children(block);
    let mut title: Option<String> = None;

    for (idx, child) in children.iter().enumerate() {
        match page.tag(*child) {
            Some(tag) if tag == layout.label_tag => {
                let label = page.text(*child).trim().to_string();
                if !label.is_empty() && label != layout.download_label {
                    title = Some(label);
                }
            }
            Some(tag) if tag == layout.link_tag => {
                let hoster_label = children
                    .get(idx + 1)
                    .filter(|next| page.tag(**next).is_none())
                    .map(|next| page.text(*next))
                    .unwrap_or_default();
                if !hoster_label.contains(hoster) {
                    continue;
                }
                let (Some(release_title), Some(href)) = (title.as_ref(), page.attr(*child, "href"))
                else {
                    scout_trace!("Skipping {} link without title or href", hoster);
                    continue;
                };
                out.push(ReleaseCandidate::new(release_title.clone(), href.trim()));
            }
            _ => {}
        }
    }
}
