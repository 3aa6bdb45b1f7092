//! Page-to-document conversion pipeline.
//!
//! A [`Converter`] runs the stages in order: fetch the page, parse it,
//! walk the DOM (fetching images as they are met), assemble the document
//! and, for DOCX output, serialize it. A page fetch failure aborts the
//! conversion; image failures are handled by the walker's error mode.
//!
//! # Example
//!
//! ```no_run
//! use webdocx::convert::{ConvertOptions, Converter};
//!
//! fn main() -> webdocx::Result<()> {
//!     let converter = Converter::new(ConvertOptions::default())?;
//!     let bytes = converter.url_to_docx_with_progress("https://example.com/case/1", |stage| {
//!         println!("{}", stage);
//!     })?;
//!     std::fs::write("case.docx", bytes)?;
//!     Ok(())
//! }
//! ```

use crate::assemble::DocumentAssembler;
use crate::error::{Error, Result};
use crate::fetch::{FetchOptions, HttpFetcher, ResourceFetcher};
use crate::model::Document;
use crate::render;
use crate::walker::{DomWalker, ListMode, WalkOptions};
use chrono::{DateTime, Utc};
use scraper::Html;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Options for page conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Network options for page and image requests
    pub fetch: FetchOptions,

    /// DOM walk options
    pub walk: WalkOptions,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fetch options.
    pub fn with_fetch_options(mut self, options: FetchOptions) -> Self {
        self.fetch = options;
        self
    }

    /// Set walk options.
    pub fn with_walk_options(mut self, options: WalkOptions) -> Self {
        self.walk = options;
        self
    }

    /// Route requests through a proxy endpoint.
    pub fn with_proxy(mut self, proxy: Url) -> Self {
        self.fetch = self.fetch.with_proxy(proxy);
        self
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch = self.fetch.with_timeout(timeout);
        self
    }

    /// Set list mode.
    pub fn with_list_mode(mut self, mode: ListMode) -> Self {
        self.walk = self.walk.with_list_mode(mode);
        self
    }

    /// Enable or disable figure cross-references.
    pub fn with_cross_references(mut self, enabled: bool) -> Self {
        self.walk = self.walk.with_cross_references(enabled);
        self
    }

    /// Fail on the first image that cannot be embedded.
    pub fn strict(mut self) -> Self {
        self.walk = self.walk.strict();
        self
    }
}

/// Conversion stage, reported to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Downloading the page HTML
    FetchingPage,
    /// Parsing HTML into a DOM
    ParsingContent,
    /// Walking the DOM and fetching images
    ProcessingContent,
    /// Serializing the DOCX archive
    GeneratingDocument,
    /// Conversion finished
    Done,
}

impl Stage {
    /// Status message shown for this stage.
    pub fn message(&self) -> &'static str {
        match self {
            Stage::FetchingPage => "Fetching page...",
            Stage::ParsingContent => "Parsing content...",
            Stage::ProcessingContent => "Processing content...",
            Stage::GeneratingDocument => "Generating Word document...",
            Stage::Done => "Done!",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Parse a page URL, assuming `https` when the scheme is missing.
pub fn parse_page_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidUrl("empty page URL".into()));
    }
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", input))?,
        Err(e) => return Err(e.into()),
    };
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("unsupported scheme: {}", url.scheme())));
    }
    Ok(url)
}

/// Runs conversions with one fetcher and one set of options.
pub struct Converter<F = HttpFetcher> {
    fetcher: F,
    options: ConvertOptions,
}

impl Converter<HttpFetcher> {
    /// Create a converter that fetches over HTTP.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        let fetcher = HttpFetcher::with_options(&options.fetch)?;
        Ok(Self { fetcher, options })
    }
}

impl<F: ResourceFetcher> Converter<F> {
    /// Create a converter with a custom fetcher.
    pub fn with_fetcher(fetcher: F, options: ConvertOptions) -> Self {
        Self { fetcher, options }
    }

    /// Fetcher used for page and image requests.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Fetch a page and convert it to a document.
    pub fn convert_url(&self, url: &str) -> Result<Document> {
        self.convert_url_with_progress(url, |_| {})
    }

    /// Fetch a page and convert it, reporting each stage.
    pub fn convert_url_with_progress<P>(&self, url: &str, mut progress: P) -> Result<Document>
    where
        P: FnMut(Stage),
    {
        let page_url = parse_page_url(url)?;

        progress(Stage::FetchingPage);
        log::info!("fetching {}", page_url);
        let html = self.fetcher.fetch_text(&page_url)?;
        let fetched_at = Utc::now();

        self.convert_parsed(&html, Some(page_url), Some(fetched_at), &mut progress)
    }

    /// Convert HTML that is already in hand.
    ///
    /// `base_url` resolves relative image sources; without it only absolute
    /// and `data:` images can be embedded.
    pub fn convert_html(&self, html: &str, base_url: Option<&str>) -> Result<Document> {
        self.convert_html_with_progress(html, base_url, |_| {})
    }

    /// Convert HTML that is already in hand, reporting each stage.
    pub fn convert_html_with_progress<P>(
        &self,
        html: &str,
        base_url: Option<&str>,
        mut progress: P,
    ) -> Result<Document>
    where
        P: FnMut(Stage),
    {
        let base = base_url.map(parse_page_url).transpose()?;
        self.convert_parsed(html, base, None, &mut progress)
    }

    /// Fetch a page and serialize it straight to DOCX bytes.
    pub fn url_to_docx(&self, url: &str) -> Result<Vec<u8>> {
        self.url_to_docx_with_progress(url, |_| {})
    }

    /// Fetch a page and serialize it to DOCX bytes, reporting each stage.
    pub fn url_to_docx_with_progress<P>(&self, url: &str, mut progress: P) -> Result<Vec<u8>>
    where
        P: FnMut(Stage),
    {
        let doc = self.convert_url_with_progress(url, &mut progress)?;
        progress(Stage::GeneratingDocument);
        let bytes = render::to_docx(&doc)?;
        progress(Stage::Done);
        Ok(bytes)
    }

    fn convert_parsed<P>(
        &self,
        html: &str,
        base: Option<Url>,
        fetched_at: Option<DateTime<Utc>>,
        progress: &mut P,
    ) -> Result<Document>
    where
        P: FnMut(Stage),
    {
        progress(Stage::ParsingContent);
        let parsed = Html::parse_document(html);

        progress(Stage::ProcessingContent);
        let mut walker = DomWalker::new(&self.fetcher, self.options.walk.clone());
        let mut assembler = DocumentAssembler::new();
        if let Some(base) = base {
            walker = walker.with_base_url(base.clone());
            assembler = assembler.with_source_url(base);
        }
        if let Some(fetched_at) = fetched_at {
            assembler = assembler.with_fetched_at(fetched_at);
        }
        let output = walker.walk_document(&parsed)?;
        Ok(assembler.assemble(output))
    }
}
