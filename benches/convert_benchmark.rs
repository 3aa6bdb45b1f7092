//! Benchmarks for webdocx conversion performance.
//!
//! Run with: cargo bench
//!
//! Pages are synthetic and served from memory, so only parsing, walking
//! and rendering are measured.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use webdocx::convert::{ConvertOptions, Converter};
use webdocx::fetch::MemoryFetcher;

const PAGE: &str = "https://example.com/poster";

/// Creates a poster-like page with one figure per section.
fn create_test_page(sections: usize) -> String {
    let mut html = String::from("<html><head><title>Benchmark</title></head><body>");
    html.push_str("<h1>Benchmark poster</h1>");

    for i in 1..=sections {
        html.push_str(&format!("<h2>Section {}</h2>", i));
        html.push_str(&format!(
            "<p>Paragraph {} refers to <b>Figure {}</b> and Fig. {} in passing.</p>",
            i,
            i,
            i + 1
        ));
        html.push_str("<ul><li>first point</li><li>second point<ol><li>nested</li></ol></li></ul>");
        html.push_str(&format!(
            "<figure><img src=\"/img/{}.png\"><figcaption>Figure {}. Synthetic</figcaption></figure>",
            i, i
        ));
    }

    html.push_str("</body></html>");
    html
}

fn create_test_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(64, 48, image::Rgb([90, 90, 90]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn create_fetcher(sections: usize) -> MemoryFetcher {
    let png = create_test_png();
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert_html(PAGE, create_test_page(sections));
    for i in 1..=sections {
        fetcher.insert(format!("https://example.com/img/{}.png", i), png.clone());
    }
    fetcher
}

/// Benchmark image format detection.
fn bench_format_detection(c: &mut Criterion) {
    let png = create_test_png();
    let text = b"<!DOCTYPE html><html></html>";

    c.bench_function("detect_png", |b| {
        b.iter(|| webdocx::detect_image_format(black_box(&png)).unwrap());
    });

    c.bench_function("detect_unknown", |b| {
        b.iter(|| webdocx::detect_image_format(black_box(text)).is_err());
    });
}

/// Benchmark page conversion at various sizes.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    for sections in [1, 10, 50].iter() {
        let converter = Converter::with_fetcher(create_fetcher(*sections), ConvertOptions::default());

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| converter.convert_url(black_box(PAGE)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark DOCX serialization of an already converted page.
fn bench_docx_rendering(c: &mut Criterion) {
    let converter = Converter::with_fetcher(create_fetcher(10), ConvertOptions::default());
    let doc = converter.convert_url(PAGE).unwrap();

    c.bench_function("docx_10_sections", |b| {
        b.iter(|| webdocx::render::to_docx(black_box(&doc)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_conversion,
    bench_docx_rendering,
);
criterion_main!(benches);
