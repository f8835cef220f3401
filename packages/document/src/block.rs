use serde::{Deserialize, Serialize};

/// Two spaces of indentation per nesting level in the text form.
pub(crate) const INDENT: &str = "  ";

/// Line prefix that marks a collapsible toggle block.
pub(crate) const TOGGLE_MARKER: &str = "> ";

/// Completed checkbox tokens. Content never begins with one of these:
/// any text that does is reinterpreted as a Check block.
pub(crate) const CHECK_UNCHECKED_MARKER: &str = "- [ ] ";
pub(crate) const CHECK_CHECKED_MARKER: &str = "- [x] ";

/// A single node of a task document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    /// Plain text line
    Line { content: String },

    /// Collapsible section holding child blocks. `is_open` is display
    /// state only and never survives encoding.
    Toggle {
        content: String,
        is_open: bool,
        children: Vec<Block>,
    },

    /// Checkbox item
    Check { content: String, checked: bool },
}

/// Discriminant for [`Block`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Line,
    Toggle,
    Check,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Line => "line",
            BlockKind::Toggle => "toggle",
            BlockKind::Check => "check",
        }
    }
}

impl Block {
    /// Creates an empty block of the given kind. Toggles start open.
    pub fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Line => Block::Line {
                content: String::new(),
            },
            BlockKind::Toggle => Block::Toggle {
                content: String::new(),
                is_open: true,
                children: Vec::new(),
            },
            BlockKind::Check => Block::Check {
                content: String::new(),
                checked: false,
            },
        }
    }

    pub fn line(content: impl Into<String>) -> Self {
        Block::Line {
            content: content.into(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Line { .. } => BlockKind::Line,
            Block::Toggle { .. } => BlockKind::Toggle,
            Block::Check { .. } => BlockKind::Check,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Block::Line { content } => content,
            Block::Toggle { content, .. } => content,
            Block::Check { content, .. } => content,
        }
    }

    pub fn content_mut(&mut self) -> &mut String {
        match self {
            Block::Line { content } => content,
            Block::Toggle { content, .. } => content,
            Block::Check { content, .. } => content,
        }
    }

    /// Child blocks, for kinds that can have them.
    pub fn children(&self) -> Option<&Vec<Block>> {
        match self {
            Block::Toggle { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::Toggle { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Reinterprets edited text that begins with a structural marker.
    ///
    /// `"> rest"` becomes an open, childless Toggle and a completed
    /// checkbox token (`"- [ ] rest"` / `"- [x] rest"`) becomes a Check,
    /// with the marker stripped into the content. Returns `None` when the
    /// text carries no marker. The conversion is one-directional; there is
    /// no text form that turns a Toggle or Check back into a Line.
    pub fn from_marker(text: &str) -> Option<Block> {
        if let Some(rest) = text.strip_prefix(TOGGLE_MARKER) {
            return Some(Block::Toggle {
                content: rest.to_string(),
                is_open: true,
                children: Vec::new(),
            });
        }
        if let Some(rest) = text.strip_prefix(CHECK_UNCHECKED_MARKER) {
            return Some(Block::Check {
                content: rest.to_string(),
                checked: false,
            });
        }
        if let Some(rest) = text.strip_prefix(CHECK_CHECKED_MARKER) {
            return Some(Block::Check {
                content: rest.to_string(),
                checked: true,
            });
        }
        None
    }
}

/// An ordered sequence of top-level blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}
