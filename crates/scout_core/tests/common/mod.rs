//! In-memory page trees for exercising extraction without an HTML parser.
#![allow(dead_code)]

use std::sync::Once;

use scout_core::PageQuery;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scout_logging::initialize_for_tests);
}

pub enum Tree {
    El {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<Tree>,
    },
    Text(String),
}

pub fn el(tag: &'static str, children: Vec<Tree>) -> Tree {
    Tree::El {
        tag,
        attrs: Vec::new(),
        children,
    }
}

pub fn el_attrs(tag: &'static str, attrs: Vec<(&'static str, &str)>, children: Vec<Tree>) -> Tree {
    Tree::El {
        tag,
        attrs: attrs.into_iter().map(|(k, v)| (k, v.to_string())).collect(),
        children,
    }
}

pub fn text(value: &str) -> Tree {
    Tree::Text(value.to_string())
}

pub fn strong(value: &str) -> Tree {
    el("strong", vec![text(value)])
}

pub fn link(href: &str, label: &str) -> Tree {
    el_attrs("a", vec![("href", href)], vec![text(label)])
}

pub fn next_link(href: &str) -> Tree {
    el_attrs("a", vec![("class", "next"), ("href", href)], vec![text("Next")])
}

/// A listing block in the catalog site's layout: title label, then one
/// `Download:` label + link + hoster text per mirror.
pub fn release_block(title: &str, mirrors: &[(&str, &str)]) -> Tree {
    let mut children = vec![strong(title), el("br", vec![])];
    for (href, hoster) in mirrors {
        children.push(strong("Download:"));
        children.push(text(" "));
        children.push(link(href, "hier"));
        children.push(text(&format!(" | {hoster}")));
        children.push(el("br", vec![]));
    }
    el("p", children)
}

pub fn runtime_block(minutes: u32) -> Tree {
    el("p", vec![strong("Dauer:"), text(&format!(" {minutes} Min."))])
}

enum Kind {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
    },
    Text(String),
}

struct Node {
    kind: Kind,
    children: Vec<usize>,
}

pub struct FixturePage {
    nodes: Vec<Node>,
    roots: Vec<usize>,
}

impl FixturePage {
    pub fn new(roots: Vec<Tree>) -> Self {
        let mut page = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        for tree in roots {
            let id = page.push(tree);
            page.roots.push(id);
        }
        page
    }

    fn push(&mut self, tree: Tree) -> usize {
        match tree {
            Tree::Text(value) => {
                self.nodes.push(Node {
                    kind: Kind::Text(value),
                    children: Vec::new(),
                });
                self.nodes.len() - 1
            }
            Tree::El {
                tag,
                attrs,
                children,
            } => {
                let ids: Vec<usize> = children.into_iter().map(|child| self.push(child)).collect();
                self.nodes.push(Node {
                    kind: Kind::Element { tag, attrs },
                    children: ids,
                });
                self.nodes.len() - 1
            }
        }
    }

    fn preorder(&self, id: usize, out: &mut Vec<usize>) {
        out.push(id);
        for child in &self.nodes[id].children {
            self.preorder(*child, out);
        }
    }

    fn matches(&self, id: usize, simple: &str) -> bool {
        let Kind::Element { tag, attrs } = &self.nodes[id].kind else {
            return false;
        };
        let attr = |name: &str| attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str());
        if let Some((name, rest)) = simple.split_once('[') {
            let Some((key, value)) = rest.trim_end_matches(']').split_once('=') else {
                return false;
            };
            return *tag == name && attr(key) == Some(value);
        }
        if let Some((name, class)) = simple.split_once('.') {
            return *tag == name
                && attr("class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class));
        }
        *tag == simple
    }
}

impl PageQuery for FixturePage {
    type Node = usize;

    fn select(&self, selector: &str) -> Vec<usize> {
        let mut order = Vec::new();
        for root in &self.roots {
            self.preorder(*root, &mut order);
        }
        let parts: Vec<&str> = selector.split(',').map(str::trim).collect();
        order
            .into_iter()
            .filter(|id| parts.iter().any(|part| self.matches(*id, part)))
            .collect()
    }

    fn children(&self, node: usize) -> Vec<usize> {
        self.nodes[node].children.clone()
    }

    fn tag(&self, node: usize) -> Option<&str> {
        match &self.nodes[node].kind {
            Kind::Element { tag, .. } => Some(*tag),
            Kind::Text(_) => None,
        }
    }

    fn text(&self, node: usize) -> String {
        match &self.nodes[node].kind {
            Kind::Text(value) => value.clone(),
            Kind::Element { .. } => self.nodes[node]
                .children
                .iter()
                .map(|child| self.text(*child))
                .collect(),
        }
    }

    fn attr(&self, node: usize, name: &str) -> Option<String> {
        match &self.nodes[node].kind {
            Kind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone()),
            Kind::Text(_) => None,
        }
    }
}
