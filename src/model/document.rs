//! Document-level types.

use super::ParagraphBlock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum page width in twips (A4 portrait).
pub const MIN_PAGE_WIDTH: u32 = 11906;

/// Page height in twips (A4 portrait).
pub const PAGE_HEIGHT: u32 = 16838;

/// Margin on every side in twips.
pub const PAGE_MARGIN: u32 = 1000;

/// Twips per CSS pixel at 96 dpi.
pub const TWIPS_PER_PIXEL: u32 = 15;

/// Horizontal allowance added around the widest image, in twips.
pub const IMAGE_WIDTH_ALLOWANCE: u32 = 3000;

/// A converted document: paragraphs plus page geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source metadata
    pub metadata: Metadata,

    /// Paragraphs in document order
    pub paragraphs: Vec<ParagraphBlock>,

    /// Page geometry
    pub layout: PageLayout,
}

impl Document {
    /// Create a new empty document with the minimum page size.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            paragraphs: Vec::new(),
            layout: PageLayout::default(),
        }
    }

    /// Number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Check if the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Find the paragraph carrying the given bookmark.
    pub fn find_bookmark(&self, name: &str) -> Option<&ParagraphBlock> {
        self.paragraphs.iter().find(|p| p.bookmark() == Some(name))
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Page size and margins in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page width
    pub width: u32,

    /// Page height
    pub height: u32,

    /// Margin applied to all four sides
    pub margin: u32,
}

impl PageLayout {
    /// Size the page to fit the widest image without clipping.
    ///
    /// The width never drops below A4 and grows monotonically with
    /// `max_image_width_px`.
    pub fn for_max_image_width(max_image_width_px: u32) -> Self {
        let fitted = max_image_width_px
            .saturating_mul(TWIPS_PER_PIXEL)
            .saturating_add(IMAGE_WIDTH_ALLOWANCE);
        Self {
            width: MIN_PAGE_WIDTH.max(fitted),
            height: PAGE_HEIGHT,
            margin: PAGE_MARGIN,
        }
    }

    /// Usable width between the margins.
    pub fn content_width(&self) -> u32 {
        self.width.saturating_sub(self.margin * 2)
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::for_max_image_width(0)
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Page URL the document was converted from
    pub source_url: Option<String>,

    /// Contents of the page `<title>`
    pub title: Option<String>,

    /// When the page was fetched
    pub fetched_at: Option<DateTime<Utc>>,

    /// Number of images embedded
    pub image_count: u32,

    /// Number of images skipped because they could not be fetched or decoded
    pub skipped_images: u32,

    /// Number of figure bookmarks minted
    pub bookmark_count: u32,

    /// Number of internal figure links
    pub link_count: u32,

    /// Widest embedded image in pixels
    pub max_image_width: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.layout.width, MIN_PAGE_WIDTH);
    }

    #[test]
    fn test_page_width_floor() {
        assert_eq!(PageLayout::for_max_image_width(0).width, MIN_PAGE_WIDTH);
        assert_eq!(PageLayout::for_max_image_width(400).width, MIN_PAGE_WIDTH);
        assert_eq!(PageLayout::for_max_image_width(1000).width, 18000);
    }

    #[test]
    fn test_page_width_monotonic() {
        let mut previous = 0;
        for px in (0..4000).step_by(37) {
            let width = PageLayout::for_max_image_width(px).width;
            assert!(width >= previous);
            previous = width;
        }
    }

    #[test]
    fn test_fixed_geometry() {
        let layout = PageLayout::for_max_image_width(2000);
        assert_eq!(layout.height, PAGE_HEIGHT);
        assert_eq!(layout.margin, PAGE_MARGIN);
        assert_eq!(layout.content_width(), layout.width - 2000);
    }
}
