/// Content handed to the renderer, as delivered by the CMS
#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    Null,
    /// Empty, plain text, or raw markup
    Text(String),
    Blocks(Vec<Block>),
    Single(Block),
    /// Numbers, booleans, anything else the renderer has no use for
    Other,
}

/// Inline formatting flags on a text run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
}

/// A leaf run of text with its formatting flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

/// List numbering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    Ordered,
    #[default]
    Unordered,
}

/// Image reference attached to an image block
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub url: String,
    pub alt_text: Option<String>,
}

/// One node of the CMS rich-text document.
///
/// `children` is `None` when the CMS sent no child array at all, which is
/// distinct from an empty one for unknown kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextRun),
    Paragraph {
        children: Option<Vec<Block>>,
    },
    Heading {
        level: Option<i64>,
        children: Option<Vec<Block>>,
    },
    List {
        format: ListFormat,
        children: Option<Vec<Block>>,
    },
    ListItem {
        children: Option<Vec<Block>>,
    },
    Quote {
        children: Option<Vec<Block>>,
    },
    Code {
        children: Option<Vec<Block>>,
    },
    Link {
        url: Option<String>,
        children: Option<Vec<Block>>,
    },
    Image {
        media: Option<Media>,
    },
    Unknown {
        kind: String,
        children: Option<Vec<Block>>,
    },
    /// Not an object at all
    Invalid,
}

impl Block {
    /// Child blocks, for kinds that have them.
    pub fn children(&self) -> Option<&[Block]> {
        match self {
            Block::Paragraph { children }
            | Block::Heading { children, .. }
            | Block::List { children, .. }
            | Block::ListItem { children }
            | Block::Quote { children }
            | Block::Code { children }
            | Block::Link { children, .. }
            | Block::Unknown { children, .. } => children.as_deref(),
            Block::Text(_) | Block::Image { .. } | Block::Invalid => None,
        }
    }
}
