//! Content renderer: turns a [`ContentValue`] into a keyed tree of
//! presentation [`Node`]s.
//!
//! Rendering is total. Malformed or partial input degrades to defaults and
//! never produces an error. The single side channel is [`TrustedMarkup`],
//! which carries a raw CMS string that backends inject without escaping.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::block::{Block, ContentValue, ListFormat, TextRun, TextStyle};

/// Anchor target used when a link has no url
pub const PLACEHOLDER_HREF: &str = "#";

/// Heading level used when the CMS level is missing or out of range
pub const DEFAULT_HEADING_LEVEL: u8 = 2;

/// Stable identity of a node, built from positional indices along the
/// traversal path (`"0"`, `"0-2"`, `"0-2-1"`). CMS ids are never used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Key of the `index`-th top-level block.
    pub fn root(index: usize) -> Self {
        Key(index.to_string())
    }

    /// Key of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        Key(format!("{}-{}", self.0, index))
    }

    fn nested(&self, suffix: &str) -> Self {
        Key(format!("{}-{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw markup string from the CMS that the host environment renders
/// verbatim.
///
/// This is a trust boundary: the payload is not sanitized. Only use it when
/// the CMS is the sole producer of the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrustedMarkup(String);

impl TrustedMarkup {
    pub fn new(raw: impl Into<String>) -> Self {
        TrustedMarkup(raw.into())
    }

    /// The exact string received from the CMS.
    pub fn as_raw(&self) -> &str {
        &self.0
    }

    pub fn into_raw(self) -> String {
        self.0
    }
}

/// What a node is and the attributes it carries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeKind {
    Text { text: String },
    Strong,
    Emphasis,
    Underline,
    Strikethrough,
    InlineCode,
    Paragraph,
    Heading { level: u8 },
    List { ordered: bool },
    ListItem,
    Blockquote,
    /// Outer element of a code block; always wraps one `InlineCode` node
    Preformatted,
    Anchor { href: String },
    Image { src: String, alt: String },
    /// Neutral wrapper for block kinds the renderer does not know
    Generic,
}

/// One node of the rendered presentation tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub key: Key,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(key: Key, kind: NodeKind, children: Vec<Node>) -> Self {
        Node {
            key,
            kind,
            children,
        }
    }

    pub fn leaf(key: Key, kind: NodeKind) -> Self {
        Self::new(key, kind, Vec::new())
    }

    /// Concatenated text of this subtree, without any formatting.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { text } => out.push_str(text),
            NodeKind::Image { alt, .. } => out.push_str(alt),
            _ => {
                for child in &self.children {
                    child.push_plain_text(out);
                }
                if is_block_level(&self.kind) && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }
}

fn is_block_level(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::List { .. }
            | NodeKind::ListItem
            | NodeKind::Blockquote
            | NodeKind::Preformatted
    )
}

/// Result of rendering a [`ContentValue`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Output {
    /// Plain text, passed through unchanged
    Text(String),
    /// Raw markup to be injected without escaping
    Markup(TrustedMarkup),
    /// A single block object
    Node(Node),
    /// A block list, in input order
    Nodes(Vec<Node>),
}

impl Output {
    /// Top-level nodes, if this output is a block tree.
    pub fn nodes(&self) -> &[Node] {
        match self {
            Output::Node(node) => std::slice::from_ref(node),
            Output::Nodes(nodes) => nodes,
            Output::Text(_) | Output::Markup(_) => &[],
        }
    }

    /// Text content with formatting removed. Trusted markup is returned raw.
    pub fn plain_text(&self) -> String {
        match self {
            Output::Text(text) => text.clone(),
            Output::Markup(markup) => markup.as_raw().to_string(),
            Output::Node(_) | Output::Nodes(_) => {
                let mut out = String::new();
                for node in self.nodes() {
                    node.push_plain_text(&mut out);
                }
                out
            }
        }
    }
}

/// Render a content value.
///
/// Returns `None` for null, blank strings, scalars, and a single block that
/// renders to nothing.
pub fn render(content: &ContentValue) -> Option<Output> {
    match content {
        ContentValue::Null | ContentValue::Other => None,
        ContentValue::Text(text) => render_string(text),
        ContentValue::Blocks(blocks) => {
            let nodes = blocks
                .iter()
                .enumerate()
                .filter_map(|(i, block)| render_keyed(block, Key::root(i)))
                .collect();
            Some(Output::Nodes(nodes))
        }
        ContentValue::Single(block) => render_block(block, Key::root(0)).map(Output::Node),
    }
}

/// True if the string contains something shaped like an opening tag.
pub fn looks_like_markup(text: &str) -> bool {
    static MARKUP_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = MARKUP_REGEX.get_or_init(|| Regex::new(r"(?s)<[a-zA-Z].*>").unwrap());
    re.is_match(text)
}

fn render_string(text: &str) -> Option<Output> {
    if text.trim().is_empty() {
        return None;
    }
    if looks_like_markup(text) {
        debug!(len = text.len(), "passing CMS string through as trusted markup");
        return Some(Output::Markup(TrustedMarkup::new(text)));
    }
    Some(Output::Text(text.to_string()))
}

/// Render one block under the given key.
pub fn render_block(block: &Block, key: Key) -> Option<Node> {
    // Children first, so every kind below sees the same rendered list
    let children = block.children().map(|c| render_children(c, &key));

    let kind = match block {
        Block::Invalid => return None,
        Block::Text(run) => return Some(render_run(run, key)),
        Block::Image { media } => {
            let media = media.as_ref()?;
            return Some(Node::leaf(
                key,
                NodeKind::Image {
                    src: media.url.clone(),
                    alt: media.alt_text.clone().unwrap_or_default(),
                },
            ));
        }
        Block::Code { .. } => {
            let inner = Node::new(
                key.nested("code"),
                NodeKind::InlineCode,
                children.unwrap_or_default(),
            );
            return Some(Node::new(key, NodeKind::Preformatted, vec![inner]));
        }
        Block::Paragraph { .. } => NodeKind::Paragraph,
        Block::Heading { level, .. } => NodeKind::Heading {
            level: heading_level(*level),
        },
        Block::List { format, .. } => NodeKind::List {
            ordered: *format == ListFormat::Ordered,
        },
        Block::ListItem { .. } => NodeKind::ListItem,
        Block::Quote { .. } => NodeKind::Blockquote,
        Block::Link { url, .. } => NodeKind::Anchor {
            href: url
                .as_deref()
                .filter(|url| !url.is_empty())
                .unwrap_or(PLACEHOLDER_HREF)
                .to_string(),
        },
        Block::Unknown { kind, .. } => {
            if children.is_none() {
                debug!(kind = %kind, key = %key, "dropping unknown block without children");
                return None;
            }
            debug!(kind = %kind, key = %key, "rendering unknown block as generic wrapper");
            NodeKind::Generic
        }
    };

    Some(Node::new(key, kind, children.unwrap_or_default()))
}

fn render_children(blocks: &[Block], parent: &Key) -> Vec<Node> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| render_keyed(block, parent.child(i)))
        .collect()
}

fn render_keyed(block: &Block, key: Key) -> Option<Node> {
    trace!(key = %key, "rendering block");
    let node = render_block(block, key.clone());
    if node.is_none() {
        debug!(key = %key, "block rendered to nothing");
    }
    node
}

fn render_run(run: &TextRun, key: Key) -> Node {
    let text = NodeKind::Text {
        text: run.text.clone(),
    };
    match inline_wrapper(&run.style) {
        Some(wrapper) => {
            let leaf = Node::leaf(key.child(0), text);
            Node::new(key, wrapper, vec![leaf])
        }
        None => Node::leaf(key, text),
    }
}

/// At most one wrapper: the first set flag in bold, italic, underline,
/// strikethrough, code order. Lower-priority flags are ignored.
fn inline_wrapper(style: &TextStyle) -> Option<NodeKind> {
    [
        (style.bold, NodeKind::Strong),
        (style.italic, NodeKind::Emphasis),
        (style.underline, NodeKind::Underline),
        (style.strikethrough, NodeKind::Strikethrough),
        (style.code, NodeKind::InlineCode),
    ]
    .into_iter()
    .find_map(|(set, kind)| set.then_some(kind))
}

fn heading_level(level: Option<i64>) -> u8 {
    match level {
        Some(level @ 1..=6) => level as u8,
        _ => DEFAULT_HEADING_LEVEL,
    }
}
