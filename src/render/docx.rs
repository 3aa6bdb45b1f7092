//! DOCX serialization.
//!
//! Maps the document model onto `docx-rs`: page geometry from the layout,
//! styled runs, internal hyperlinks to named bookmarks, embedded PNG
//! images at natural size, heading styles and list numbering.

use crate::detect::is_png;
use crate::error::{Error, Result};
use crate::model::{Document, Inline, ListKind, ParagraphBlock, TextRun, BODY_SIZE};
use docx_rs::{
    AbstractNumbering, BreakType, Docx, Hyperlink, HyperlinkType, IndentLevel, Level, LevelJc,
    LevelOverride, LevelText, LineSpacing, NumberFormat, Numbering, NumberingId, PageMargin,
    Paragraph, Pic, Run, SpecialIndentType, Start, Style, StyleType,
};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Text color of internal links.
pub const HYPERLINK_COLOR: &str = "0563C1";

const BULLET_ABSTRACT_ID: usize = 1;
const DECIMAL_ABSTRACT_ID: usize = 2;
const LIST_LEVELS: usize = 9;
const LIST_INDENT: i32 = 720;
const LIST_HANGING: i32 = 360;
const BULLET_SYMBOLS: [&str; 3] = ["•", "◦", "▪"];

/// Serialize a document to DOCX bytes.
pub fn to_docx(doc: &Document) -> Result<Vec<u8>> {
    DocxWriter::new().write(doc)
}

/// Serialize a document and write it to `path`.
pub fn write_docx<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let bytes = to_docx(doc)?;
    std::fs::write(path.as_ref(), bytes)?;
    log::info!("wrote {}", path.as_ref().display());
    Ok(())
}

/// Stateful DOCX writer.
///
/// Assigns numeric ids to bookmarks in order of appearance and one
/// numbering instance to each list, so that separate lists restart their
/// numbering.
#[derive(Debug, Default)]
pub struct DocxWriter {
    bookmark_ids: HashMap<String, usize>,
    next_bookmark_id: usize,
    numbering_ids: HashMap<(u32, ListKind), usize>,
    numberings: Vec<(usize, usize)>,
}

impl DocxWriter {
    /// Create a writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `doc` into DOCX bytes.
    pub fn write(mut self, doc: &Document) -> Result<Vec<u8>> {
        let docx = self.build(doc)?;
        let mut cursor = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut cursor)
            .map_err(|e| Error::Docx(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Build the `docx-rs` document model.
    pub fn build(&mut self, doc: &Document) -> Result<Docx> {
        let layout = doc.layout;
        let margin = layout.margin as i32;

        let mut docx = Docx::new()
            .page_size(layout.width, layout.height)
            .page_margin(
                PageMargin::new()
                    .top(margin)
                    .bottom(margin)
                    .left(margin)
                    .right(margin),
            );

        for level in 1..=6 {
            docx = docx.add_style(
                Style::new(format!("Heading{}", level), StyleType::Paragraph)
                    .name(format!("Heading {}", level)),
            );
        }
        docx = docx
            .add_abstract_numbering(abstract_numbering(BULLET_ABSTRACT_ID, ListKind::Bullet))
            .add_abstract_numbering(abstract_numbering(DECIMAL_ABSTRACT_ID, ListKind::Numbered));

        for paragraph in &doc.paragraphs {
            docx = docx.add_paragraph(self.paragraph(paragraph)?);
        }

        for &(id, abstract_id) in &self.numberings {
            docx = docx.add_numbering(
                Numbering::new(id, abstract_id).add_override(LevelOverride::new(0).start(1)),
            );
        }

        Ok(docx)
    }

    fn paragraph(&mut self, block: &ParagraphBlock) -> Result<Paragraph> {
        let mut paragraph = Paragraph::new();

        for inline in block.inlines() {
            paragraph = match inline {
                Inline::Text(run) => paragraph.add_run(text_run(run)),
                Inline::Link { anchor, run } => paragraph.add_hyperlink(
                    Hyperlink::new(anchor.as_str(), HyperlinkType::Anchor).add_run(
                        text_run(run)
                            .color(HYPERLINK_COLOR)
                            .underline("single"),
                    ),
                ),
                Inline::Image(image) => {
                    let png = png_bytes(&image.bytes)?;
                    let pic = Pic::new_with_dimensions(png, image.width, image.height);
                    paragraph.add_run(Run::new().add_image(pic))
                }
                Inline::LineBreak => paragraph.add_run(Run::new().add_break(BreakType::TextWrapping)),
                Inline::BookmarkStart { name } => {
                    let id = self.bookmark_id(name);
                    paragraph.add_bookmark_start(id, name.as_str())
                }
                Inline::BookmarkEnd { name } => {
                    let id = self.bookmark_id(name);
                    paragraph.add_bookmark_end(id)
                }
            };
        }

        let layout = &block.layout;
        if let Some(after) = layout.spacing_after {
            paragraph = paragraph.line_spacing(LineSpacing::new().after(after));
        }
        if let Some(level) = layout.heading_level {
            paragraph = paragraph.style(&format!("Heading{}", level));
        }
        if let Some(list) = layout.list {
            let id = self.numbering_id(list.instance, list.kind);
            let level = (list.level as usize).min(LIST_LEVELS - 1);
            paragraph = paragraph.numbering(NumberingId::new(id), IndentLevel::new(level));
        }

        Ok(paragraph)
    }

    fn bookmark_id(&mut self, name: &str) -> usize {
        if let Some(&id) = self.bookmark_ids.get(name) {
            return id;
        }
        let id = self.next_bookmark_id;
        self.next_bookmark_id += 1;
        self.bookmark_ids.insert(name.to_string(), id);
        id
    }

    fn numbering_id(&mut self, instance: u32, kind: ListKind) -> usize {
        if let Some(&id) = self.numbering_ids.get(&(instance, kind)) {
            return id;
        }
        let id = self.numberings.len() + 1;
        let abstract_id = match kind {
            ListKind::Bullet => BULLET_ABSTRACT_ID,
            ListKind::Numbered => DECIMAL_ABSTRACT_ID,
        };
        self.numbering_ids.insert((instance, kind), id);
        self.numberings.push((id, abstract_id));
        id
    }
}

fn text_run(run: &TextRun) -> Run {
    let mut out = Run::new().add_text(run.text.as_str());
    if run.style.bold {
        out = out.bold();
    }
    if run.style.italic {
        out = out.italic();
    }
    if run.style.size != BODY_SIZE {
        out = out.size(run.style.size as usize);
    }
    out
}

fn abstract_numbering(id: usize, kind: ListKind) -> AbstractNumbering {
    let mut numbering = AbstractNumbering::new(id);
    for level in 0..LIST_LEVELS {
        let (format, text) = match kind {
            ListKind::Bullet => (
                "bullet",
                BULLET_SYMBOLS[level % BULLET_SYMBOLS.len()].to_string(),
            ),
            ListKind::Numbered => ("decimal", format!("%{}.", level + 1)),
        };
        numbering = numbering.add_level(
            Level::new(
                level,
                Start::new(1),
                NumberFormat::new(format),
                LevelText::new(text),
                LevelJc::new("left"),
            )
            .indent(
                Some(LIST_INDENT * (level as i32 + 1)),
                Some(SpecialIndentType::Hanging(LIST_HANGING)),
                None,
                None,
            ),
        );
    }
    numbering
}

// PNG passes through; everything else is decoded and re-encoded.
fn png_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    if is_png(bytes) {
        return Ok(bytes.to_vec());
    }
    let decoded = image::load_from_memory(bytes)?;
    let mut out = Cursor::new(Vec::new());
    decoded.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}
