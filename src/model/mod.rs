//! Document model types for converted web content.
//!
//! This module defines the intermediate representation that bridges the
//! DOM walk and DOCX serialization: descriptors produced per node, the
//! finalized paragraphs they are flushed into, and the page geometry.

mod descriptor;
mod document;
mod paragraph;
mod style;

pub use descriptor::{ContentDescriptor, ImageData};
pub use document::{
    Document, Metadata, PageLayout, IMAGE_WIDTH_ALLOWANCE, MIN_PAGE_WIDTH, PAGE_HEIGHT,
    PAGE_MARGIN, TWIPS_PER_PIXEL,
};
pub use paragraph::{
    Inline, ListInfo, ListKind, ParagraphBlock, ParagraphLayout, TextRun, BLOCK_SPACING_AFTER,
};
pub use style::{StyleContext, BODY_SIZE, CAPTION_SIZE, HEADING_SIZE, TITLE_SIZE};
