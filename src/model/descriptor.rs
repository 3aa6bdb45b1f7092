//! Content descriptors produced by the DOM walk.

use super::StyleContext;
use serde::{Deserialize, Serialize};

/// An ordered unit of paragraph content, produced during DOM traversal
/// and owned by the paragraph buffer until the paragraph is flushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDescriptor {
    /// A run of collapsed text with the style in effect at its node
    Text {
        /// Text content, whitespace already collapsed
        value: String,
        /// Inherited style
        style: StyleContext,
    },

    /// A soft line break inside the paragraph
    LineBreak,

    /// A fetched and measured image
    Image(ImageData),
}

impl ContentDescriptor {
    /// Create a text descriptor.
    pub fn text(value: impl Into<String>, style: StyleContext) -> Self {
        ContentDescriptor::Text {
            value: value.into(),
            style,
        }
    }

    /// Check if this descriptor carries visible content.
    pub fn is_content(&self) -> bool {
        match self {
            ContentDescriptor::Text { value, .. } => !value.trim().is_empty(),
            ContentDescriptor::LineBreak => false,
            ContentDescriptor::Image(_) => true,
        }
    }
}

/// Image bytes together with their natively decoded dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Raw image bytes as fetched
    #[serde(skip_serializing, default)]
    pub bytes: Vec<u8>,

    /// Intrinsic width in pixels
    pub width: u32,

    /// Intrinsic height in pixels
    pub height: u32,

    /// MIME type detected from the bytes
    pub mime_type: String,

    /// Absolute URL the image was fetched from (None for inline data)
    pub source: Option<String>,
}

impl ImageData {
    /// Create image data from bytes and measured dimensions.
    pub fn new(bytes: Vec<u8>, width: u32, height: u32, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            width,
            height,
            mime_type: mime_type.into(),
            source: None,
        }
    }

    /// Record the URL the image came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
