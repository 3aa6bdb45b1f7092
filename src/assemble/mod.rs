//! Document assembly.
//!
//! Turns the output of a walk into a [`Document`]: page geometry is
//! computed once from the widest image, metadata is filled in, and an
//! empty page gets a placeholder paragraph so the output is never blank.

use crate::model::{Document, Metadata, PageLayout, ParagraphBlock, ParagraphLayout};
use crate::walker::WalkOutput;
use chrono::{DateTime, Utc};
use url::Url;

/// Text of the paragraph emitted when a page has no content.
pub const PLACEHOLDER_TEXT: &str = "No content found.";

/// Builds documents from walk output.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    source_url: Option<Url>,
    fetched_at: Option<DateTime<Utc>>,
}

impl DocumentAssembler {
    /// Create an assembler without source information.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the page URL in the document metadata.
    pub fn with_source_url(mut self, url: Url) -> Self {
        self.source_url = Some(url);
        self
    }

    /// Record when the page was fetched.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }

    /// Assemble the final document.
    pub fn assemble(&self, output: WalkOutput) -> Document {
        let layout = PageLayout::for_max_image_width(output.max_image_width);

        let mut paragraphs = output.paragraphs;
        if paragraphs.is_empty() {
            log::info!("no content found; emitting placeholder paragraph");
            let mut placeholder = ParagraphBlock::with_text(PLACEHOLDER_TEXT);
            placeholder.layout = ParagraphLayout::block();
            paragraphs.push(placeholder);
        }

        let metadata = Metadata {
            source_url: self.source_url.as_ref().map(Url::to_string),
            title: output.title,
            fetched_at: self.fetched_at,
            image_count: output.image_count,
            skipped_images: output.skipped_images,
            bookmark_count: output.bookmark_count,
            link_count: output.link_count,
            max_image_width: output.max_image_width,
        };

        Document {
            metadata,
            paragraphs,
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MIN_PAGE_WIDTH;

    #[test]
    fn test_empty_output_gets_placeholder() {
        let doc = DocumentAssembler::new().assemble(WalkOutput::default());
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.paragraphs[0].plain_text(), PLACEHOLDER_TEXT);
        assert_eq!(doc.layout.width, MIN_PAGE_WIDTH);
    }

    #[test]
    fn test_layout_and_metadata() {
        let output = WalkOutput {
            paragraphs: vec![ParagraphBlock::with_text("hello")],
            title: Some("Case".into()),
            max_image_width: 1000,
            image_count: 2,
            skipped_images: 1,
            bookmark_count: 1,
            link_count: 3,
        };
        let url = Url::parse("https://example.com/case").unwrap();
        let doc = DocumentAssembler::new()
            .with_source_url(url)
            .assemble(output);

        assert_eq!(doc.layout.width, 18000);
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.metadata.source_url.as_deref(), Some("https://example.com/case"));
        assert_eq!(doc.metadata.title.as_deref(), Some("Case"));
        assert_eq!(doc.metadata.image_count, 2);
        assert_eq!(doc.metadata.skipped_images, 1);
        assert_eq!(doc.metadata.link_count, 3);
    }
}
