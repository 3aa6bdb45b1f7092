//! DOM traversal into paragraphs.
//!
//! [`DomWalker`] visits a parsed HTML tree depth-first and turns it into
//! flushed [`ParagraphBlock`]s. Text nodes contribute runs styled by their
//! ancestors, block tags delimit paragraphs, images are fetched and
//! measured in document order, and each flushed paragraph goes through the
//! figure cross-referencer.
//!
//! All conversion state lives in a [`WalkState`] owned by one walk, so a
//! walker can be reused for any number of documents.

mod options;
pub mod tags;

pub use options::{ErrorMode, ListMode, WalkOptions, DEFAULT_MEDIA_HOST};

use crate::detect::{detect_image_format, ImageKind};
use crate::error::{Error, Result};
use crate::fetch::{resolve_image_source, ImageSource, ResourceFetcher};
use crate::model::{
    ContentDescriptor, ImageData, ListInfo, ListKind, ParagraphBlock, ParagraphLayout,
    StyleContext,
};
use crate::xref::FigureCrossReferencer;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Prefix used for list items in [`ListMode::BulletPrefix`].
pub const BULLET_PREFIX: &str = "• ";

fn whitespace() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"))
}

/// Collapse every whitespace run to a single space.
///
/// Leading and trailing whitespace is kept (as one space) so that adjacent
/// inline runs stay separated.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace().replace_all(text, " ").into_owned()
}

/// Result of walking one document.
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Flushed paragraphs in document order
    pub paragraphs: Vec<ParagraphBlock>,

    /// Contents of the `<title>` element
    pub title: Option<String>,

    /// Widest embedded image in pixels
    pub max_image_width: u32,

    /// Number of images embedded
    pub image_count: u32,

    /// Number of images skipped after a fetch or decode failure
    pub skipped_images: u32,

    /// Number of figure bookmarks minted
    pub bookmark_count: u32,

    /// Number of internal figure links
    pub link_count: u32,
}

/// Accumulator for a single walk.
///
/// Holds the pending paragraph buffer together with everything that spans
/// the whole document: finalized paragraphs, the widest image, figure
/// bookmark bookkeeping and counters.
#[derive(Debug)]
pub struct WalkState {
    pending: Vec<ContentDescriptor>,
    paragraphs: Vec<ParagraphBlock>,
    xref: FigureCrossReferencer,
    list_mode: ListMode,
    max_image_width: u32,
    image_count: u32,
    skipped_images: u32,
    next_list_instance: u32,
}

impl WalkState {
    /// Create an empty state.
    pub fn new(list_mode: ListMode, cross_references: bool) -> Self {
        Self {
            pending: Vec::new(),
            paragraphs: Vec::new(),
            xref: FigureCrossReferencer::with_enabled(cross_references),
            list_mode,
            max_image_width: 0,
            image_count: 0,
            skipped_images: 0,
            next_list_instance: 1,
        }
    }

    /// Append a descriptor to the pending paragraph.
    pub fn push(&mut self, descriptor: ContentDescriptor) {
        self.pending.push(descriptor);
    }

    /// Finalize the pending buffer into a paragraph with `layout`.
    ///
    /// A buffer without visible content (nothing, or only line breaks) is
    /// discarded. Adjacent text with identical style is merged first.
    pub fn flush(&mut self, layout: ParagraphLayout) {
        if !self.pending.iter().any(ContentDescriptor::is_content) {
            self.pending.clear();
            return;
        }

        let mut descriptors = merge_adjacent(std::mem::take(&mut self.pending));
        let mut layout = layout;
        if self.list_mode == ListMode::BulletPrefix && layout.list.take().is_some() {
            descriptors.insert(0, ContentDescriptor::text(BULLET_PREFIX, StyleContext::new()));
        }

        let paragraph = self.xref.process(descriptors, layout);
        self.paragraphs.push(paragraph);
    }

    /// Flush a single image as its own paragraph.
    fn push_image(&mut self, image: ImageData) {
        self.max_image_width = self.max_image_width.max(image.width);
        self.image_count += 1;
        self.pending.push(ContentDescriptor::Image(image));
        self.flush(ParagraphLayout::block());
    }

    fn next_list_instance(&mut self) -> u32 {
        let instance = self.next_list_instance;
        self.next_list_instance += 1;
        instance
    }

    /// Flush whatever is left and produce the walk output.
    pub fn finish(mut self, title: Option<String>) -> WalkOutput {
        self.flush(ParagraphLayout::default());
        WalkOutput {
            paragraphs: self.paragraphs,
            title,
            max_image_width: self.max_image_width,
            image_count: self.image_count,
            skipped_images: self.skipped_images,
            bookmark_count: self.xref.bookmark_count(),
            link_count: self.xref.link_count(),
        }
    }
}

// Innermost list an element sits in.
#[derive(Debug, Clone, Copy)]
struct ListFrame {
    kind: ListKind,
    depth: u8,
    instance: u32,
}

// Context copied down the tree; children never mutate their parent's.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    style: StyleContext,
    layout: ParagraphLayout,
    list: Option<ListFrame>,
}

/// Walks parsed HTML into paragraphs.
pub struct DomWalker<'a> {
    fetcher: &'a dyn ResourceFetcher,
    options: WalkOptions,
    base_url: Option<Url>,
}

impl<'a> DomWalker<'a> {
    /// Create a walker that fetches images through `fetcher`.
    pub fn new(fetcher: &'a dyn ResourceFetcher, options: WalkOptions) -> Self {
        Self {
            fetcher,
            options,
            base_url: None,
        }
    }

    /// Set the page URL relative image sources resolve against.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Walk options in effect.
    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Walk a full document, starting at `<body>` (or the root element
    /// when there is none).
    pub fn walk_document(&self, html: &Html) -> Result<WalkOutput> {
        let title = document_title(html)?;
        let body = selector("body")?;
        let root = html
            .select(&body)
            .next()
            .unwrap_or_else(|| html.root_element());
        self.walk_root(root, StyleContext::new(), title)
    }

    /// Walk an HTML fragment.
    pub fn walk_fragment(&self, fragment: &str) -> Result<WalkOutput> {
        let html = Html::parse_fragment(fragment);
        self.walk_root(html.root_element(), StyleContext::new(), None)
    }

    /// Walk the subtree under `root` with an inherited style.
    pub fn walk_root(
        &self,
        root: ElementRef<'_>,
        style: StyleContext,
        title: Option<String>,
    ) -> Result<WalkOutput> {
        let mut state = WalkState::new(self.options.list_mode, self.options.cross_references);
        let ctx = Context {
            style,
            ..Default::default()
        };
        self.walk_children(root, ctx, &mut state)?;
        let output = state.finish(title);
        log::debug!(
            "walked {} paragraphs, {} images ({} skipped)",
            output.paragraphs.len(),
            output.image_count,
            output.skipped_images
        );
        Ok(output)
    }

    fn walk_children(&self, element: ElementRef<'_>, ctx: Context, state: &mut WalkState) -> Result<()> {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                walk_text(text, ctx.style, state);
            } else if let Some(child_element) = ElementRef::wrap(child) {
                self.walk_element(child_element, ctx, state)?;
            }
        }
        Ok(())
    }

    fn walk_element(&self, element: ElementRef<'_>, ctx: Context, state: &mut WalkState) -> Result<()> {
        let tag = element.value().name();
        if tags::is_skipped(tag) || self.options.skip_tags.iter().any(|t| t == tag) {
            return Ok(());
        }

        match tag {
            "img" => return self.walk_image(element, ctx, state),
            "br" => {
                // a break alone is dropped by the closing flush
                state.flush(ctx.layout);
                state.push(ContentDescriptor::LineBreak);
                state.flush(ParagraphLayout::block());
                return Ok(());
            }
            _ => {}
        }

        let list = match tag {
            "ul" | "ol" => {
                let kind = if tag == "ol" {
                    ListKind::Numbered
                } else {
                    ListKind::Bullet
                };
                let frame = match ctx.list {
                    Some(outer) => ListFrame {
                        kind,
                        depth: outer.depth.saturating_add(1),
                        instance: outer.instance,
                    },
                    None => ListFrame {
                        kind,
                        depth: 1,
                        instance: state.next_list_instance(),
                    },
                };
                Some(frame)
            }
            _ => ctx.list,
        };

        let block = tags::is_block(tag);
        let layout = if block {
            self.block_layout(tag, ctx, state)
        } else {
            ctx.layout
        };

        if block {
            state.flush(ctx.layout);
        }

        let child_ctx = Context {
            style: tags::derive_style(tag, ctx.style),
            layout,
            list,
        };
        self.walk_children(element, child_ctx, state)?;

        if block {
            state.flush(layout);
        }
        Ok(())
    }

    fn block_layout(&self, tag: &str, ctx: Context, state: &mut WalkState) -> ParagraphLayout {
        if let Some(level) = tags::heading_level(tag) {
            return ParagraphLayout::heading(level);
        }
        if tag != "li" {
            return ParagraphLayout::block();
        }
        let info = match ctx.list {
            Some(frame) => ListInfo {
                kind: frame.kind,
                level: frame.depth.saturating_sub(1),
                instance: frame.instance,
            },
            // stray <li> outside any list
            None => ListInfo::bullet(0, state.next_list_instance()),
        };
        ParagraphLayout::list_item(info)
    }

    fn walk_image(&self, element: ElementRef<'_>, ctx: Context, state: &mut WalkState) -> Result<()> {
        state.flush(ctx.layout);

        let value = element.value();
        let Some(src) = value.attr("src").or_else(|| value.attr("data-src")) else {
            log::debug!("skipping <img> without src");
            return Ok(());
        };

        match self.load_image(src) {
            Ok(image) => state.push_image(image),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("skipping image {}: {}", src, e);
                state.skipped_images += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Resolve, fetch and measure one image source.
    pub fn load_image(&self, src: &str) -> Result<ImageData> {
        let source = resolve_image_source(
            src,
            self.base_url.as_ref(),
            &self.options.strip_query_hosts,
        )?;

        let (bytes, origin) = match source {
            ImageSource::Remote(url) => {
                log::debug!("fetching image {}", url);
                let resource = self.fetcher.fetch(&url)?;
                (resource.bytes, Some(url.to_string()))
            }
            ImageSource::Inline(bytes) => (bytes, None),
        };

        let kind = detect_image_format(&bytes)?;
        if kind == ImageKind::Svg {
            return Err(Error::ImageDecode("SVG images cannot be embedded".into()));
        }

        let decoded = image::load_from_memory(&bytes)?;
        let mut image = ImageData::new(bytes, decoded.width(), decoded.height(), kind.mime_type());
        if let Some(origin) = origin {
            image = image.with_source(origin);
        }
        Ok(image)
    }
}

fn walk_text(text: &str, style: StyleContext, state: &mut WalkState) {
    let collapsed = collapse_whitespace(text);
    if collapsed.trim().is_empty() {
        return;
    }
    state.push(ContentDescriptor::text(collapsed, style));
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Html(format!("invalid selector {}: {:?}", css, e)))
}

fn document_title(html: &Html) -> Result<Option<String>> {
    let title = selector("title")?;
    Ok(html.select(&title).next().and_then(|element| {
        let text = collapse_whitespace(&element.text().collect::<String>());
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }))
}

// Merge neighbouring text descriptors that share a style.
fn merge_adjacent(descriptors: Vec<ContentDescriptor>) -> Vec<ContentDescriptor> {
    let mut merged: Vec<ContentDescriptor> = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if let (
            Some(ContentDescriptor::Text { value: prev, style: prev_style }),
            ContentDescriptor::Text { value, style },
        ) = (merged.last_mut(), &descriptor)
        {
            if *prev_style == *style {
                prev.push_str(value);
                continue;
            }
        }
        merged.push(descriptor);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::model::{Inline, BODY_SIZE, TITLE_SIZE};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn walk(html: &str) -> WalkOutput {
        let fetcher = MemoryFetcher::new();
        DomWalker::new(&fetcher, WalkOptions::default())
            .walk_fragment(html)
            .unwrap()
    }

    fn texts(p: &ParagraphBlock) -> Vec<String> {
        p.inlines()
            .iter()
            .filter_map(|i| match i {
                Inline::Text(run) => Some(run.text.clone()),
                Inline::Link { run, .. } => Some(run.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), " a b ");
        assert_eq!(collapse_whitespace("a"), "a");
    }

    #[test]
    fn test_whitespace_only_text_produces_nothing() {
        let out = walk("<div>   \n\t  </div><p> </p>");
        assert!(out.paragraphs.is_empty());
    }

    #[test]
    fn test_inline_only_fragment_is_one_paragraph() {
        let out = walk("plain <b>bold</b> <i>it</i> plain");
        assert_eq!(out.paragraphs.len(), 1);
        // the lone space between </b> and <i> is a whitespace-only node,
        // so "bold" and "it" render joined
        assert_eq!(
            texts(&out.paragraphs[0]),
            vec!["plain ", "bold", "it", " plain"]
        );
    }

    #[test]
    fn test_adjacent_same_style_runs_merge() {
        let out = walk("<p>one <span>two</span> three</p>");
        assert_eq!(texts(&out.paragraphs[0]), vec!["one two three"]);
    }

    #[test]
    fn test_heading_style_and_layout() {
        let out = walk("<h1>Title</h1><h2>Sub</h2><p>Body</p>");
        assert_eq!(out.paragraphs.len(), 3);

        let h1 = &out.paragraphs[0];
        assert_eq!(h1.layout.heading_level, Some(1));
        match &h1.inlines()[0] {
            Inline::Text(run) => {
                assert!(run.style.bold);
                assert_eq!(run.style.size, TITLE_SIZE);
            }
            other => panic!("unexpected inline {:?}", other),
        }
        assert_eq!(out.paragraphs[1].layout.heading_level, Some(2));
        match &out.paragraphs[2].inlines()[0] {
            Inline::Text(run) => assert_eq!(run.style.size, BODY_SIZE),
            other => panic!("unexpected inline {:?}", other),
        }
    }

    #[test]
    fn test_nested_block_flushes_with_enclosing_layout() {
        let out = walk("<div>before<p>inner</p>after</div>");
        let plain: Vec<String> = out.paragraphs.iter().map(|p| p.plain_text()).collect();
        assert_eq!(plain, vec!["before", "inner", "after"]);
    }

    #[test]
    fn test_skipped_tags_are_ignored() {
        let out = walk("<p>keep<script>var x = 1;</script><style>p {}</style></p>");
        assert_eq!(out.paragraphs[0].plain_text(), "keep");

        let fetcher = MemoryFetcher::new();
        let walker = DomWalker::new(&fetcher, WalkOptions::new().skip_tag("nav"));
        let out = walker.walk_fragment("<nav>menu</nav><p>text</p>").unwrap();
        assert_eq!(out.paragraphs.len(), 1);
        assert_eq!(out.paragraphs[0].plain_text(), "text");
    }

    #[test]
    fn test_line_break_splits_paragraph() {
        let out = walk("<p>one<br>two</p><p><br></p>");
        let plain: Vec<String> = out.paragraphs.iter().map(|p| p.plain_text()).collect();
        assert_eq!(plain, vec!["one", "two"]);
        assert!(out
            .paragraphs
            .iter()
            .all(|p| !p.inlines().contains(&Inline::LineBreak)));
    }

    #[test]
    fn test_line_break_inside_styled_run() {
        let out = walk("<b>first<br>second</b>");
        assert_eq!(out.paragraphs.len(), 2);
        match &out.paragraphs[1].inlines()[0] {
            Inline::Text(run) => {
                assert_eq!(run.text, "second");
                assert!(run.style.bold);
            }
            other => panic!("unexpected inline {:?}", other),
        }
    }

    #[test]
    fn test_list_items_get_numbering_layout() {
        let out = walk("<ul><li>a<ol><li>b</li></ol></li></ul><ol><li>c</li></ol>");
        let lists: Vec<ListInfo> = out
            .paragraphs
            .iter()
            .map(|p| p.layout.list.unwrap())
            .collect();

        assert_eq!(lists[0], ListInfo::bullet(0, 1));
        assert_eq!(lists[1], ListInfo::numbered(1, 1));
        assert_eq!(lists[2], ListInfo::numbered(0, 2));
    }

    #[test]
    fn test_bullet_prefix_mode() {
        let fetcher = MemoryFetcher::new();
        let walker =
            DomWalker::new(&fetcher, WalkOptions::new().with_list_mode(ListMode::BulletPrefix));
        let out = walker.walk_fragment("<ul><li>first</li><li>second</li></ul>").unwrap();

        assert_eq!(out.paragraphs.len(), 2);
        assert_eq!(out.paragraphs[0].plain_text(), "• first");
        assert!(out.paragraphs[0].layout.list.is_none());
    }

    #[test]
    fn test_image_is_own_paragraph() {
        let fetcher = MemoryFetcher::new().with("https://example.com/a.png", png(40, 20));
        let walker = DomWalker::new(&fetcher, WalkOptions::default())
            .with_base_url(Url::parse("https://example.com/page").unwrap());
        let out = walker
            .walk_fragment("<p>before <img src=\"/a.png\"> after</p>")
            .unwrap();

        let plain: Vec<String> = out.paragraphs.iter().map(|p| p.plain_text()).collect();
        assert_eq!(plain, vec!["before ", "", " after"]);
        let image = out.paragraphs[1].images().next().unwrap();
        assert_eq!((image.width, image.height), (40, 20));
        assert_eq!(image.source.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(out.max_image_width, 40);
        assert_eq!(out.image_count, 1);
    }

    #[test]
    fn test_image_without_src_still_splits_text() {
        let out = walk("a<img alt=\"x\">b");
        let plain: Vec<String> = out.paragraphs.iter().map(|p| p.plain_text()).collect();
        assert_eq!(plain, vec!["a", "b"]);
        assert_eq!(out.image_count, 0);
        assert_eq!(out.skipped_images, 0);
    }

    #[test]
    fn test_failed_image_is_skipped() {
        let fetcher = MemoryFetcher::new();
        let walker = DomWalker::new(&fetcher, WalkOptions::default())
            .with_base_url(Url::parse("https://example.com/").unwrap());
        let out = walker
            .walk_fragment("<p>a</p><img src=\"missing.png\"><p>b</p>")
            .unwrap();

        assert_eq!(out.paragraphs.len(), 2);
        assert_eq!(out.skipped_images, 1);
        assert_eq!(out.image_count, 0);
    }

    #[test]
    fn test_failed_image_aborts_in_strict_mode() {
        let fetcher = MemoryFetcher::new();
        let walker = DomWalker::new(&fetcher, WalkOptions::new().strict())
            .with_base_url(Url::parse("https://example.com/").unwrap());
        let result = walker.walk_fragment("<img src=\"missing.png\">");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_svg_is_skipped() {
        let fetcher = MemoryFetcher::new();
        let walker = DomWalker::new(&fetcher, WalkOptions::default());
        let out = walker
            .walk_fragment("<img src=\"data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg'></svg>\">")
            .unwrap();
        assert!(out.paragraphs.is_empty());
        assert_eq!(out.skipped_images, 1);
    }

    #[test]
    fn test_document_title_and_body() {
        let fetcher = MemoryFetcher::new();
        let walker = DomWalker::new(&fetcher, WalkOptions::default());
        let html = Html::parse_document(
            "<html><head><title> Case  42 </title></head><body><p>text</p></body></html>",
        );
        let out = walker.walk_document(&html).unwrap();
        assert_eq!(out.title.as_deref(), Some("Case 42"));
        assert_eq!(out.paragraphs.len(), 1);
    }

    #[test]
    fn test_merge_adjacent() {
        let plain = StyleContext::new();
        let bold = plain.with_bold();
        let merged = merge_adjacent(vec![
            ContentDescriptor::text("a", plain),
            ContentDescriptor::text("b", plain),
            ContentDescriptor::text("c", bold),
            ContentDescriptor::LineBreak,
            ContentDescriptor::text("d", bold),
        ]);
        assert_eq!(
            merged,
            vec![
                ContentDescriptor::text("ab", plain),
                ContentDescriptor::text("c", bold),
                ContentDescriptor::LineBreak,
                ContentDescriptor::text("d", bold),
            ]
        );
    }
}
