//! End-to-end conversion tests: page HTML in, document model out.

use std::cell::Cell;
use std::io::Cursor;

use url::Url;
use webdocx::convert::{ConvertOptions, Converter};
use webdocx::error::{Error, Result};
use webdocx::fetch::{FetchedResource, MemoryFetcher, ResourceFetcher};
use webdocx::model::{Inline, BODY_SIZE, CAPTION_SIZE, MIN_PAGE_WIDTH, TITLE_SIZE};
use webdocx::ListMode;

const PAGE: &str = "https://example.com/page";

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn figure_page() -> &'static str {
    r#"<html><head><title>Case 7</title></head><body>
        <h1>Title</h1>
        <p>See <b>Figure 1</b> below.</p>
        <figure>
            <img src="/x.png">
            <figcaption>Figure 1. Sample</figcaption>
        </figure>
    </body></html>"#
}

fn figure_fetcher() -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert_html(PAGE, figure_page());
    fetcher.insert("https://example.com/x.png", png(400, 300));
    fetcher
}

/// Fetcher that counts requests and fails every image.
struct BrokenImageFetcher {
    page: String,
    calls: Cell<usize>,
}

impl ResourceFetcher for BrokenImageFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        self.calls.set(self.calls.get() + 1);
        if url.as_str() == PAGE {
            Ok(FetchedResource::new(self.page.clone().into_bytes()))
        } else {
            Err(Error::Http(format!("connection reset: {}", url)))
        }
    }
}

#[test]
fn test_figure_scenario() {
    let converter = Converter::with_fetcher(figure_fetcher(), ConvertOptions::default());
    let doc = converter.convert_url(PAGE).unwrap();

    assert_eq!(doc.paragraph_count(), 4);

    // heading
    let heading = &doc.paragraphs[0];
    assert_eq!(heading.layout.heading_level, Some(1));
    match &heading.inlines()[0] {
        Inline::Text(run) => {
            assert_eq!(run.text, "Title");
            assert!(run.style.bold);
            assert_eq!(run.style.size, TITLE_SIZE);
        }
        other => panic!("unexpected inline {:?}", other),
    }

    // mention links to the caption bookmark
    let mention = &doc.paragraphs[1];
    assert_eq!(mention.plain_text(), "See Figure 1 below.");
    assert_eq!(mention.link_anchors(), vec!["fig-1"]);
    match &mention.inlines()[1] {
        Inline::Link { run, .. } => assert!(run.style.bold),
        other => panic!("unexpected inline {:?}", other),
    }
    match &mention.inlines()[2] {
        Inline::Text(run) => {
            assert_eq!(run.text, " below.");
            assert!(!run.style.bold && !run.style.italic);
            assert_eq!(run.style.size, BODY_SIZE);
        }
        other => panic!("unexpected inline {:?}", other),
    }

    // image paragraph
    let image = doc.paragraphs[2].images().next().unwrap();
    assert_eq!((image.width, image.height), (400, 300));

    // caption keeps its own mention plain
    let caption = &doc.paragraphs[3];
    assert_eq!(caption.bookmark(), Some("fig-1"));
    assert!(caption.link_anchors().is_empty());
    assert_eq!(caption.plain_text(), "Figure 1. Sample");
    let caption_runs: Vec<_> = caption
        .inlines()
        .iter()
        .filter_map(|i| match i {
            Inline::Text(run) => Some(run),
            _ => None,
        })
        .collect();
    assert!(!caption_runs.is_empty());
    assert!(caption_runs
        .iter()
        .all(|run| run.style.italic && run.style.size == CAPTION_SIZE));

    assert!(doc.find_bookmark("fig-1").is_some());
    assert_eq!(doc.layout.width, MIN_PAGE_WIDTH);
    assert_eq!(doc.metadata.title.as_deref(), Some("Case 7"));
    assert_eq!(doc.metadata.image_count, 1);
    assert_eq!(doc.metadata.bookmark_count, 1);
    assert_eq!(doc.metadata.link_count, 1);
}

#[test]
fn test_wide_image_widens_page() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert_html(PAGE, r#"<body><img src="wide.png"><img src="narrow.png"></body>"#);
    fetcher.insert("https://example.com/wide.png", png(1000, 10));
    fetcher.insert("https://example.com/narrow.png", png(20, 10));

    let doc = Converter::with_fetcher(fetcher, ConvertOptions::default())
        .convert_url(PAGE)
        .unwrap();
    assert_eq!(doc.metadata.max_image_width, 1000);
    assert_eq!(doc.layout.width, 1000 * 15 + 3000);
}

#[test]
fn test_images_fetched_in_document_order() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert_html(
        PAGE,
        r#"<body><p>a</p><img src="/b.png"><div><img src="/a.png"></div></body>"#,
    );
    fetcher.insert("https://example.com/a.png", png(2, 2));
    fetcher.insert("https://example.com/b.png", png(3, 3));

    let converter = Converter::with_fetcher(fetcher, ConvertOptions::default());
    let doc = converter.convert_url(PAGE).unwrap();

    assert_eq!(
        converter.fetcher().requests(),
        vec![
            "https://example.com/page".to_string(),
            "https://example.com/b.png".to_string(),
            "https://example.com/a.png".to_string(),
        ]
    );
    let widths: Vec<u32> = doc
        .paragraphs
        .iter()
        .filter_map(|p| p.images().next().map(|i| i.width))
        .collect();
    assert_eq!(widths, vec![3, 2]);
}

#[test]
fn test_failed_images_skipped_order_preserved() {
    let fetcher = BrokenImageFetcher {
        page: "<body><p>one</p><img src=\"a.png\"><p>two</p><img src=\"b.png\"><p>three</p></body>"
            .to_string(),
        calls: Cell::new(0),
    };
    let converter = Converter::with_fetcher(fetcher, ConvertOptions::default());
    let doc = converter.convert_url(PAGE).unwrap();

    let texts: Vec<String> = doc.paragraphs.iter().map(|p| p.plain_text()).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
    assert_eq!(doc.metadata.skipped_images, 2);
    assert_eq!(converter.fetcher().calls.get(), 3);
}

#[test]
fn test_empty_body_gets_placeholder() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert_html(PAGE, "<html><body>  <script>x()</script>\n </body></html>");

    let doc = Converter::with_fetcher(fetcher, ConvertOptions::default())
        .convert_url(PAGE)
        .unwrap();
    assert_eq!(doc.paragraph_count(), 1);
    assert_eq!(doc.paragraphs[0].plain_text(), "No content found.");
}

#[test]
fn test_inline_only_body_is_single_paragraph() {
    let converter = Converter::with_fetcher(MemoryFetcher::new(), ConvertOptions::default());
    let doc = converter
        .convert_html("<body>alpha <em>beta</em>   gamma</body>", None)
        .unwrap();

    assert_eq!(doc.paragraph_count(), 1);
    let runs: Vec<&str> = doc.paragraphs[0]
        .inlines()
        .iter()
        .filter_map(|i| match i {
            Inline::Text(run) => Some(run.text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(runs, vec!["alpha ", "beta", " gamma"]);
}

#[test]
fn test_conversion_is_idempotent() {
    let converter = Converter::with_fetcher(figure_fetcher(), ConvertOptions::default());
    let first = converter.convert_url(PAGE).unwrap();
    let second = converter.convert_url(PAGE).unwrap();

    assert_eq!(first.paragraphs, second.paragraphs);
    assert_eq!(second.metadata.bookmark_count, 1);
}

#[test]
fn test_cross_references_can_be_disabled() {
    let options = ConvertOptions::new().with_cross_references(false);
    let doc = Converter::with_fetcher(figure_fetcher(), options)
        .convert_url(PAGE)
        .unwrap();

    assert!(doc.paragraphs.iter().all(|p| p.bookmark().is_none()));
    assert!(doc.paragraphs.iter().all(|p| p.link_anchors().is_empty()));
}

#[test]
fn test_bullet_prefix_lists() {
    let options = ConvertOptions::new().with_list_mode(ListMode::BulletPrefix);
    let converter = Converter::with_fetcher(MemoryFetcher::new(), options);
    let doc = converter
        .convert_html("<ol><li>first</li><li>second</li></ol>", None)
        .unwrap();

    let texts: Vec<String> = doc.paragraphs.iter().map(|p| p.plain_text()).collect();
    assert_eq!(texts, vec!["• first", "• second"]);
}

#[test]
fn test_media_query_stripped_before_fetch() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert_html(
        "https://epos.myesr.org/poster/1",
        r#"<body><img src="/media/case/fig1.png?width=300&sig=abc"></body>"#,
    );
    fetcher.insert("https://epos.myesr.org/media/case/fig1.png", png(5, 5));

    let converter = Converter::with_fetcher(fetcher, ConvertOptions::default());
    let doc = converter.convert_url("https://epos.myesr.org/poster/1").unwrap();
    assert_eq!(doc.metadata.image_count, 1);
    assert_eq!(
        converter.fetcher().requests()[1],
        "https://epos.myesr.org/media/case/fig1.png"
    );
}
