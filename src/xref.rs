//! Figure cross-referencing.
//!
//! Runs once per paragraph at flush time. A paragraph whose text starts
//! with a figure reference ("Fig 2", "Fig. 2", "Figure 2", any case) is a
//! caption: it is wrapped in a `fig-<N>` bookmark. Every other figure
//! reference in any paragraph becomes an internal link to the bookmark of
//! its number, whether or not that bookmark exists anywhere.

use crate::model::{
    ContentDescriptor, Inline, ParagraphBlock, ParagraphLayout, StyleContext, TextRun,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn figure_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bfig(?:ure)?\.?\s*(\d+)").expect("figure pattern is a valid regex")
    })
}

/// Bookmark name for a figure number.
pub fn bookmark_name(number: u32) -> String {
    format!("fig-{}", number)
}

/// Figure number declared at the start of `text`, ignoring leading
/// whitespace.
pub fn caption_number(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let caps = figure_pattern().captures(trimmed)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 {
        return None;
    }
    caps.get(1)?.as_str().parse().ok()
}

/// Converts flushed descriptors into paragraphs, minting bookmarks for
/// captions and links for mentions.
///
/// State spans a whole conversion: a figure number gets at most one
/// bookmark per document, the first caption that declares it.
#[derive(Debug, Clone)]
pub struct FigureCrossReferencer {
    enabled: bool,
    minted: HashSet<u32>,
    bookmark_count: u32,
    link_count: u32,
}

impl FigureCrossReferencer {
    /// Create an enabled cross-referencer.
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// Create a cross-referencer; when disabled, text runs pass through
    /// unchanged and no bookmarks are minted.
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            minted: HashSet::new(),
            bookmark_count: 0,
            link_count: 0,
        }
    }

    /// Number of bookmarks minted so far.
    pub fn bookmark_count(&self) -> u32 {
        self.bookmark_count
    }

    /// Number of links produced so far.
    pub fn link_count(&self) -> u32 {
        self.link_count
    }

    /// Build the paragraph for one flushed descriptor sequence.
    pub fn process(
        &mut self,
        descriptors: Vec<ContentDescriptor>,
        layout: ParagraphLayout,
    ) -> ParagraphBlock {
        if !self.enabled {
            let inlines = descriptors.into_iter().map(plain_inline).collect();
            return ParagraphBlock::new(inlines, layout);
        }

        let text = paragraph_text(&descriptors);
        let caption_offset = text.len() - text.trim_start().len();
        let caption = caption_number(&text);

        let bookmark = match caption {
            Some(number) if self.minted.insert(number) => {
                self.bookmark_count += 1;
                Some(bookmark_name(number))
            }
            Some(number) => {
                log::debug!("figure {} already has a bookmark; caption left unmarked", number);
                None
            }
            None => None,
        };

        let mut inlines = Vec::with_capacity(descriptors.len() + 2);
        if let Some(ref name) = bookmark {
            inlines.push(Inline::BookmarkStart { name: name.clone() });
        }

        let mut offset = 0;
        for descriptor in descriptors {
            match descriptor {
                ContentDescriptor::Text { value, style } => {
                    let self_at = caption.map(|_| caption_offset);
                    self.split_run(&value, style, offset, self_at, &mut inlines);
                    offset += value.len();
                }
                ContentDescriptor::LineBreak => {
                    offset += 1;
                    inlines.push(Inline::LineBreak);
                }
                ContentDescriptor::Image(image) => inlines.push(Inline::Image(image)),
            }
        }

        if let Some(name) = bookmark {
            inlines.push(Inline::BookmarkEnd { name });
        }

        ParagraphBlock::new(inlines, layout)
    }

    // Split one run at figure references. A match starting at `self_at`
    // (the caption declaration) stays plain text; all others become links.
    fn split_run(
        &mut self,
        value: &str,
        style: StyleContext,
        offset: usize,
        self_at: Option<usize>,
        out: &mut Vec<Inline>,
    ) {
        let mut plain_start = 0;
        for caps in figure_pattern().captures_iter(value) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(number) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                continue;
            };
            if self_at == Some(offset + whole.start()) {
                continue;
            }

            if whole.start() > plain_start {
                out.push(Inline::Text(TextRun::styled(
                    &value[plain_start..whole.start()],
                    style,
                )));
            }
            out.push(Inline::Link {
                anchor: bookmark_name(number),
                run: TextRun::styled(whole.as_str(), style),
            });
            self.link_count += 1;
            plain_start = whole.end();
        }

        if plain_start < value.len() {
            out.push(Inline::Text(TextRun::styled(&value[plain_start..], style)));
        }
    }
}

impl Default for FigureCrossReferencer {
    fn default() -> Self {
        Self::new()
    }
}

fn paragraph_text(descriptors: &[ContentDescriptor]) -> String {
    let mut text = String::new();
    for descriptor in descriptors {
        match descriptor {
            ContentDescriptor::Text { value, .. } => text.push_str(value),
            ContentDescriptor::LineBreak => text.push('\n'),
            ContentDescriptor::Image(_) => {}
        }
    }
    text
}

fn plain_inline(descriptor: ContentDescriptor) -> Inline {
    match descriptor {
        ContentDescriptor::Text { value, style } => Inline::Text(TextRun::styled(value, style)),
        ContentDescriptor::LineBreak => Inline::LineBreak,
        ContentDescriptor::Image(image) => Inline::Image(image),
    }
}
