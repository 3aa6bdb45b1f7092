//! Paragraph and inline types.

use super::{ImageData, StyleContext};
use serde::{Deserialize, Serialize};

/// Spacing after block paragraphs, in twentieths of a point.
pub const BLOCK_SPACING_AFTER: u32 = 200;

/// A finalized paragraph of the output document.
///
/// Inline elements are fixed at construction; only the layout is open
/// for inspection after a paragraph has been flushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphBlock {
    /// Inline elements in document order
    inlines: Vec<Inline>,

    /// Paragraph layout
    pub layout: ParagraphLayout,
}

impl ParagraphBlock {
    /// Create a paragraph from finalized inline elements.
    pub fn new(inlines: Vec<Inline>, layout: ParagraphLayout) -> Self {
        Self { inlines, layout }
    }

    /// Create a paragraph with a single plain text run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(
            vec![Inline::Text(TextRun::new(text))],
            ParagraphLayout::default(),
        )
    }

    /// Inline elements of this paragraph.
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text(run) => Some(run.text.as_str()),
                Inline::Link { run, .. } => Some(run.text.as_str()),
                Inline::LineBreak => Some("\n"),
                _ => None,
            })
            .collect()
    }

    /// Images embedded in this paragraph.
    pub fn images(&self) -> impl Iterator<Item = &ImageData> {
        self.inlines.iter().filter_map(|inline| match inline {
            Inline::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Name of the bookmark this paragraph carries, if any.
    pub fn bookmark(&self) -> Option<&str> {
        self.inlines.iter().find_map(|inline| match inline {
            Inline::BookmarkStart { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Anchors of the internal links in this paragraph.
    pub fn link_anchors(&self) -> Vec<&str> {
        self.inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Link { anchor, .. } => Some(anchor.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Check if the paragraph has no visible content.
    pub fn is_empty(&self) -> bool {
        self.images().next().is_none() && self.plain_text().trim().is_empty()
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        self.layout.heading_level.is_some()
    }

    /// Check if this is a list item.
    pub fn is_list_item(&self) -> bool {
        self.layout.list.is_some()
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// A styled text run
    Text(TextRun),

    /// An internal hyperlink to a bookmark
    Link {
        /// Bookmark name the link points at
        anchor: String,
        /// Visible run
        run: TextRun,
    },

    /// An embedded image
    Image(ImageData),

    /// A line break
    LineBreak,

    /// Start of a named bookmark
    BookmarkStart {
        /// Bookmark name
        name: String,
    },

    /// End of a named bookmark
    BookmarkEnd {
        /// Bookmark name
        name: String,
    },
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    pub style: StyleContext,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: StyleContext::default(),
        }
    }

    /// Create a text run with the given style.
    pub fn styled(text: impl Into<String>, style: StyleContext) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Paragraph layout properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphLayout {
    /// Space after the paragraph in twentieths of a point
    pub spacing_after: Option<u32>,

    /// Heading level (1-6) or None for normal paragraph
    pub heading_level: Option<u8>,

    /// List information if this is a list item
    pub list: Option<ListInfo>,
}

impl ParagraphLayout {
    /// Layout of an ordinary block paragraph.
    pub fn block() -> Self {
        Self {
            spacing_after: Some(BLOCK_SPACING_AFTER),
            ..Default::default()
        }
    }

    /// Layout of a heading block.
    pub fn heading(level: u8) -> Self {
        Self {
            heading_level: Some(level.clamp(1, 6)),
            ..Self::block()
        }
    }

    /// Layout of a list item block.
    pub fn list_item(list: ListInfo) -> Self {
        Self {
            list: Some(list),
            ..Self::block()
        }
    }
}

/// Information about a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListInfo {
    /// Bulleted or numbered
    pub kind: ListKind,

    /// Nesting level (0 = top level)
    pub level: u8,

    /// Identifier of the outermost list this item belongs to
    pub instance: u32,
}

impl ListInfo {
    /// Create a bulleted list item.
    pub fn bullet(level: u8, instance: u32) -> Self {
        Self {
            kind: ListKind::Bullet,
            level,
            instance,
        }
    }

    /// Create a numbered list item.
    pub fn numbered(level: u8, instance: u32) -> Self {
        Self {
            kind: ListKind::Numbered,
            level,
            instance,
        }
    }
}

/// List kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Unordered (`<ul>`)
    Bullet,
    /// Ordered (`<ol>`)
    Numbered,
}
