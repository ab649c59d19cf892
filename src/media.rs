use crate::render::{Node, NodeKind, Output};

/// Turns CMS-relative asset paths into absolute URLs.
///
/// The renderer leaves image sources as the CMS sent them; resolution is a
/// separate pass over the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base: String,
}

impl MediaResolver {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Prefix `path` with the base unless it is already absolute.
    pub fn resolve(&self, path: &str) -> String {
        if is_absolute(path) {
            return path.to_string();
        }
        if path.is_empty() || path.starts_with('/') {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    /// Rewrite every image source in the output.
    pub fn resolve_output(&self, output: &mut Output) {
        match output {
            Output::Node(node) => self.resolve_node(node),
            Output::Nodes(nodes) => nodes.iter_mut().for_each(|n| self.resolve_node(n)),
            Output::Text(_) | Output::Markup(_) => {}
        }
    }

    pub fn resolve_node(&self, node: &mut Node) {
        if let NodeKind::Image { src, .. } = &mut node.kind {
            *src = self.resolve(src);
        }
        for child in &mut node.children {
            self.resolve_node(child);
        }
    }
}

/// Protocol-relative (`//host/x`) or carrying a URL scheme (`https:`, `data:`)
fn is_absolute(path: &str) -> bool {
    if path.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = path.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
