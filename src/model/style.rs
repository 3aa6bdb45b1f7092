//! Inherited text style.

use serde::{Deserialize, Serialize};

/// Default run size in half-points (12pt).
pub const BODY_SIZE: u32 = 24;

/// Run size for level-1 headings (16pt).
pub const TITLE_SIZE: u32 = 32;

/// Run size for headings of level 2 through 6 (14pt).
pub const HEADING_SIZE: u32 = 28;

/// Run size for figure captions (10pt).
pub const CAPTION_SIZE: u32 = 20;

/// Bold/italic/size state inherited down the DOM tree.
///
/// The context is `Copy`: each traversal level derives its own merged
/// value with the `with_*` methods and hands it to its children, so a
/// sibling branch never observes styling applied inside another branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleContext {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Size hint in half-points
    pub size: u32,
}

impl StyleContext {
    /// Create the root style (plain body text).
    pub fn new() -> Self {
        Self {
            bold: false,
            italic: false,
            size: BODY_SIZE,
        }
    }

    /// Derive a bold copy.
    pub fn with_bold(self) -> Self {
        Self { bold: true, ..self }
    }

    /// Derive an italic copy.
    pub fn with_italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    /// Derive a copy with a different size hint.
    pub fn with_size(self, size: u32) -> Self {
        Self { size, ..self }
    }

    /// Check if any styling beyond plain body text is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.size != BODY_SIZE
    }
}

impl Default for StyleContext {
    fn default() -> Self {
        Self::new()
    }
}
