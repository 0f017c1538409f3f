/// Read-only query capability over a parsed listing page.
///
/// Extraction is written against this trait only, so it runs the same over a
/// real HTML document and over hand-built fixture trees.
pub trait PageQuery {
    type Node: Copy;

    /// Document-wide selection, in document order. Unsupported or invalid
    /// selectors yield no nodes.
    fn select(&self, selector: &str) -> Vec<Self::Node>;

    /// Direct children of `node` in document order, text nodes included.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Lower-case element name, `None` for text nodes.
    fn tag(&self, node: Self::Node) -> Option<&str>;

    /// Concatenated text of `node` and its descendants.
    fn text(&self, node: Self::Node) -> String;

    fn attr(&self, node: Self::Node, name: &str) -> Option<String>;
}

/// Selectors and labels describing how the catalog site lays out listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLayout {
    pub block_selector: String,
    pub label_tag: String,
    pub link_tag: String,
    /// Caption marking a block as runtime/length information.
    pub runtime_caption: String,
    /// Label text that precedes each link and is never a release title.
    pub download_label: String,
    pub next_page_selector: String,
}

impl Default for ListingLayout {
    fn default() -> Self {
        Self {
            block_selector: "p".to_string(),
            label_tag: "strong".to_string(),
            link_tag: "a".to_string(),
            runtime_caption: "Dauer".to_string(),
            download_label: "Download:".to_string(),
            next_page_selector: "a.next, a[rel=next]".to_string(),
        }
    }
}
