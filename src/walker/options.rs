//! Walk options and configuration.

/// Content-media host whose `/media/` image URLs carry tracking queries.
pub const DEFAULT_MEDIA_HOST: &str = "epos.myesr.org";

/// Options for walking a parsed HTML page.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Error handling mode for individual images
    pub error_mode: ErrorMode,

    /// How list items are laid out
    pub list_mode: ListMode,

    /// Whether figure captions get bookmarks and mentions get links
    pub cross_references: bool,

    /// Additional tags ignored together with their subtrees
    pub skip_tags: Vec<String>,

    /// Hosts whose `/media/` image URLs lose their query string
    pub strip_query_hosts: Vec<String>,
}

impl WalkOptions {
    /// Create new walk options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the conversion on the first image that cannot be embedded.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set list mode.
    pub fn with_list_mode(mut self, mode: ListMode) -> Self {
        self.list_mode = mode;
        self
    }

    /// Enable or disable figure cross-references.
    pub fn with_cross_references(mut self, enabled: bool) -> Self {
        self.cross_references = enabled;
        self
    }

    /// Ignore an additional tag and its subtree.
    pub fn skip_tag(mut self, tag: impl Into<String>) -> Self {
        self.skip_tags.push(tag.into().to_ascii_lowercase());
        self
    }

    /// Strip `/media/` image query strings for an additional host.
    pub fn strip_query_for(mut self, host: impl Into<String>) -> Self {
        self.strip_query_hosts.push(host.into());
        self
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            list_mode: ListMode::Numbering,
            cross_references: true,
            skip_tags: Vec::new(),
            strip_query_hosts: vec![DEFAULT_MEDIA_HOST.to_string()],
        }
    }
}

/// Error handling mode for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first image error
    Strict,
    /// Log and skip images that cannot be fetched or decoded
    #[default]
    Lenient,
}

/// How list items are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Word list numbering (bullets for `ul`, decimals for `ol`)
    #[default]
    Numbering,
    /// A literal bullet character prefixed to each item
    BulletPrefix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_options_builder() {
        let options = WalkOptions::new()
            .strict()
            .with_list_mode(ListMode::BulletPrefix)
            .with_cross_references(false)
            .skip_tag("NAV")
            .strip_query_for("cdn.example.org");

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.list_mode, ListMode::BulletPrefix);
        assert!(!options.cross_references);
        assert_eq!(options.skip_tags, vec!["nav".to_string()]);
        assert_eq!(options.strip_query_hosts.len(), 2);
    }

    #[test]
    fn test_default_options() {
        let options = WalkOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.list_mode, ListMode::Numbering);
        assert!(options.cross_references);
        assert_eq!(options.strip_query_hosts, vec![DEFAULT_MEDIA_HOST.to_string()]);
    }
}
