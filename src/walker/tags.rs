//! Tag classification.

use crate::model::{StyleContext, CAPTION_SIZE, HEADING_SIZE, TITLE_SIZE};

/// Tags ignored together with their subtrees.
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "meta", "link"];

/// Tags that force a paragraph boundary before and after their content.
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "br", "figure", "figcaption",
    "article", "section", "tr",
];

/// Check if a tag is skipped with its subtree.
pub fn is_skipped(tag: &str) -> bool {
    SKIPPED_TAGS.contains(&tag)
}

/// Check if a tag is a block tag.
pub fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Heading level of `h1`..`h6`.
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

/// Style for the children of `tag`, derived from the inherited style.
pub fn derive_style(tag: &str, inherited: StyleContext) -> StyleContext {
    let mut style = inherited;
    if matches!(tag, "b" | "strong" | "dt") || heading_level(tag).is_some() {
        style = style.with_bold();
    }
    if matches!(tag, "i" | "em" | "figcaption") {
        style = style.with_italic();
    }
    match heading_level(tag) {
        Some(1) => style.with_size(TITLE_SIZE),
        Some(_) => style.with_size(HEADING_SIZE),
        None if tag == "figcaption" => style.with_size(CAPTION_SIZE),
        None => style,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BODY_SIZE;

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("header"), None);
    }

    #[test]
    fn test_derive_style() {
        let root = StyleContext::new();

        let h1 = derive_style("h1", root);
        assert!(h1.bold);
        assert_eq!(h1.size, TITLE_SIZE);

        let h3 = derive_style("h3", root);
        assert_eq!(h3.size, HEADING_SIZE);

        let caption = derive_style("figcaption", root);
        assert!(caption.italic && !caption.bold);
        assert_eq!(caption.size, CAPTION_SIZE);

        let em_in_h1 = derive_style("em", h1);
        assert!(em_in_h1.bold && em_in_h1.italic);
        assert_eq!(em_in_h1.size, TITLE_SIZE);

        // header/hr are not headings
        assert_eq!(derive_style("header", root).size, BODY_SIZE);
    }

    #[test]
    fn test_classification() {
        assert!(is_block("figcaption"));
        assert!(!is_block("span"));
        assert!(is_block("br"));
        assert!(is_skipped("script"));
        assert!(!is_skipped("img"));
    }
}
