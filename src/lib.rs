//! # webdocx
//!
//! Web page extraction to Word documents.
//!
//! This library fetches a web page, walks its DOM into styled paragraphs,
//! embeds the page's images at their natural size and writes a `.docx`
//! file. Figure captions ("Figure 3. ...") become bookmarks, and every
//! mention of a figure in the text becomes an internal link to its caption.
//!
//! ## Quick Start
//!
//! ```no_run
//! use webdocx::{convert_url, render};
//!
//! fn main() -> webdocx::Result<()> {
//!     // Fetch and convert a page
//!     let doc = convert_url("https://example.com/case/42")?;
//!
//!     // Write a Word document
//!     render::write_docx(&doc, "case.docx")?;
//!     println!("{} paragraphs, {} images", doc.paragraph_count(), doc.metadata.image_count);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Styled text**: bold, italic, heading and caption sizes follow the markup
//! - **Images**: fetched in document order, page width grows to fit the widest
//! - **Figure cross-references**: caption bookmarks and internal links
//! - **Lists**: Word numbering for `ul`/`ol`, or literal bullet prefixes
//! - **Proxy support**: route requests through a CORS-bypass endpoint
//! - **Structured reports**: template-driven radiology reports with drafted impressions

pub mod assemble;
pub mod convert;
pub mod detect;
pub mod error;
pub mod fetch;
pub mod impression;
pub mod model;
pub mod render;
pub mod report;
pub mod walker;
pub mod xref;

// Re-export commonly used types
pub use assemble::DocumentAssembler;
pub use convert::{ConvertOptions, Converter, Stage};
pub use detect::{detect_image_format, ImageKind};
pub use error::{Error, Result};
pub use fetch::{FetchOptions, HttpFetcher, MemoryFetcher, ResourceFetcher};
pub use model::{
    ContentDescriptor, Document, ImageData, Inline, ListInfo, ListKind, Metadata, PageLayout,
    ParagraphBlock, ParagraphLayout, StyleContext, TextRun,
};
pub use render::JsonFormat;
pub use report::{PatientInfo, Region, ReportForm, ReportTemplate};
pub use walker::{DomWalker, ErrorMode, ListMode, WalkOptions};
pub use xref::FigureCrossReferencer;

use std::path::Path;
use std::time::Duration;
use url::Url;

/// Fetch a page and convert it to a document.
///
/// # Arguments
///
/// * `url` - Page URL (`https://` is assumed when the scheme is missing)
///
/// # Example
///
/// ```no_run
/// use webdocx::convert_url;
///
/// let doc = convert_url("https://example.com/case/42").unwrap();
/// println!("Paragraphs: {}", doc.paragraph_count());
/// ```
pub fn convert_url(url: &str) -> Result<Document> {
    convert_url_with_options(url, ConvertOptions::default())
}

/// Fetch a page and convert it with custom options.
///
/// # Example
///
/// ```no_run
/// use webdocx::{convert_url_with_options, ConvertOptions, ListMode};
///
/// let options = ConvertOptions::new()
///     .with_list_mode(ListMode::BulletPrefix)
///     .with_cross_references(false);
/// let doc = convert_url_with_options("https://example.com/case/42", options).unwrap();
/// ```
pub fn convert_url_with_options(url: &str, options: ConvertOptions) -> Result<Document> {
    Converter::new(options)?.convert_url(url)
}

/// Convert HTML that is already in hand.
///
/// Images are still fetched over HTTP; relative sources resolve against
/// `base_url`.
///
/// # Example
///
/// ```no_run
/// use webdocx::convert_html;
///
/// let html = std::fs::read_to_string("saved-page.html").unwrap();
/// let doc = convert_html(&html, Some("https://example.com/case/42")).unwrap();
/// ```
pub fn convert_html(html: &str, base_url: Option<&str>) -> Result<Document> {
    Converter::new(ConvertOptions::default())?.convert_html(html, base_url)
}

/// Fetch a page and write it as a Word document.
///
/// # Example
///
/// ```no_run
/// use webdocx::url_to_docx;
///
/// url_to_docx("https://example.com/case/42", "case.docx").unwrap();
/// ```
pub fn url_to_docx<P: AsRef<Path>>(url: &str, path: P) -> Result<()> {
    let doc = convert_url(url)?;
    render::write_docx(&doc, path)
}

/// Builder for fetching and converting pages.
///
/// # Example
///
/// ```no_run
/// use webdocx::Webdocx;
///
/// Webdocx::new()
///     .with_proxy("http://localhost:3000/api/fetch")?
///     .bullet_prefix()
///     .lenient()
///     .convert("https://example.com/case/42")?
///     .save("case.docx")?;
/// # Ok::<(), webdocx::Error>(())
/// ```
pub struct Webdocx {
    options: ConvertOptions,
}

impl Webdocx {
    /// Create a new Webdocx builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Route page and image requests through a proxy endpoint.
    pub fn with_proxy(mut self, proxy: &str) -> Result<Self> {
        self.options = self.options.with_proxy(Url::parse(proxy)?);
        Ok(self)
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_timeout(timeout);
        self
    }

    /// Prefix list items with a bullet instead of Word numbering.
    pub fn bullet_prefix(mut self) -> Self {
        self.options = self.options.with_list_mode(ListMode::BulletPrefix);
        self
    }

    /// Disable figure bookmarks and links.
    pub fn without_cross_references(mut self) -> Self {
        self.options = self.options.with_cross_references(false);
        self
    }

    /// Skip images that cannot be embedded (the default).
    pub fn lenient(mut self) -> Self {
        self.options.walk = self.options.walk.with_error_mode(ErrorMode::Lenient);
        self
    }

    /// Fail on the first image that cannot be embedded.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Conversion options built so far.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Fetch and convert a page over HTTP.
    pub fn convert(self, url: &str) -> Result<WebdocxResult> {
        let document = Converter::new(self.options)?.convert_url(url)?;
        Ok(WebdocxResult { document })
    }

    /// Fetch and convert a page through a custom fetcher.
    pub fn convert_with<F: ResourceFetcher>(self, fetcher: F, url: &str) -> Result<WebdocxResult> {
        let document = Converter::with_fetcher(fetcher, self.options).convert_url(url)?;
        Ok(WebdocxResult { document })
    }

    /// Convert HTML that is already in hand.
    pub fn convert_html(self, html: &str, base_url: Option<&str>) -> Result<WebdocxResult> {
        let document = Converter::new(self.options)?.convert_html(html, base_url)?;
        Ok(WebdocxResult { document })
    }
}

impl Default for Webdocx {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of converting a page.
pub struct WebdocxResult {
    /// The converted document
    pub document: Document,
}

impl WebdocxResult {
    /// Serialize to DOCX bytes.
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        render::to_docx(&self.document)
    }

    /// Write a DOCX file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        render::write_docx(&self.document, path)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> String {
        render::to_text(&self.document)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
