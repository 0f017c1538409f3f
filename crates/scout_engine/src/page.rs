use ego_tree::{NodeId, NodeRef};
use scout_core::PageQuery;
use scout_logging::scout_warn;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document queried through [`PageQuery`].
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.document.tree.get(id)
    }
}

impl PageQuery for HtmlPage {
    type Node = NodeId;

    fn select(&self, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(sel) => self.document.select(&sel).map(|el| el.id()).collect(),
            Err(err) => {
                scout_warn!("Ignoring invalid selector {:?}: {:?}", selector, err);
                Vec::new()
            }
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(node) else {
            return Vec::new();
        };
        node.children()
            .filter(|child| matches!(child.value(), Node::Element(_) | Node::Text(_)))
            .map(|child| child.id())
            .collect()
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        match self.node(node)?.value() {
            Node::Element(element) => Some(element.name()),
            _ => None,
        }
    }

    fn text(&self, node: NodeId) -> String {
        let Some(node) = self.node(node) else {
            return String::new();
        };
        match node.value() {
            Node::Text(text) => {
                let value: &str = text;
                value.to_string()
            }
            _ => ElementRef::wrap(node)
                .map(|element| element.text().collect())
                .unwrap_or_default(),
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        match self.node(node)?.value() {
            Node::Element(element) => element.attr(name).map(str::to_string),
            _ => None,
        }
    }
}
