//! Plain text rendering.

use crate::model::{Document, Inline, ListKind, ParagraphBlock};
use std::collections::HashMap;

/// Convert a document to plain text.
///
/// Paragraphs are separated by blank lines, list items are prefixed with a
/// bullet or their number, and images appear as `[image WxH]`.
pub fn to_text(doc: &Document) -> String {
    let mut counters: HashMap<(u32, u8), u32> = HashMap::new();
    let mut blocks = Vec::with_capacity(doc.paragraphs.len());

    for paragraph in &doc.paragraphs {
        let mut line = String::new();
        if let Some(list) = paragraph.layout.list {
            line.push_str(&"  ".repeat(list.level as usize));
            match list.kind {
                ListKind::Bullet => line.push_str("• "),
                ListKind::Numbered => {
                    let counter = counters.entry((list.instance, list.level)).or_insert(0);
                    *counter += 1;
                    line.push_str(&format!("{}. ", counter));
                }
            }
            // deeper levels restart when a shallower item appears
            counters.retain(|&(instance, level), _| instance != list.instance || level <= list.level);
        }
        line.push_str(paragraph_text(paragraph).trim());
        blocks.push(line);
    }

    blocks.join("\n\n")
}

fn paragraph_text(paragraph: &ParagraphBlock) -> String {
    let mut text = String::new();
    for inline in paragraph.inlines() {
        match inline {
            Inline::Text(run) => text.push_str(&run.text),
            Inline::Link { run, .. } => text.push_str(&run.text),
            Inline::LineBreak => text.push('\n'),
            Inline::Image(image) => {
                text.push_str(&format!("[image {}x{}]", image.width, image.height))
            }
            Inline::BookmarkStart { .. } | Inline::BookmarkEnd { .. } => {}
        }
    }
    text
}
