//! Image `src` resolution.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

/// Where the bytes of an image come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Fetch from an absolute URL
    Remote(Url),
    /// Bytes embedded in a `data:` URL
    Inline(Vec<u8>),
}

/// Resolve an `<img src>` value against the page URL.
///
/// * absolute `http(s)` URLs are kept;
/// * scheme-relative (`//host/x`), root-relative (`/x`) and relative
///   (`x.png`, `../x.png`) values are joined onto `base`;
/// * `data:` URLs are decoded in place;
/// * for hosts listed in `strip_query_hosts`, `/media/` URLs lose their
///   query string (tracking and resize parameters).
pub fn resolve_image_source(
    src: &str,
    base: Option<&Url>,
    strip_query_hosts: &[String],
) -> Result<ImageSource> {
    let src = src.trim();
    if src.is_empty() {
        return Err(Error::InvalidUrl("empty image src".into()));
    }

    if is_data_url(src) {
        return decode_data_url(src).map(ImageSource::Inline);
    }

    let mut url = match Url::parse(src) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                Error::InvalidUrl(format!("relative image src without base URL: {}", src))
            })?;
            base.join(src)?
        }
        Err(e) => return Err(e.into()),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "unsupported image scheme: {}",
            url.scheme()
        )));
    }

    let strip = url
        .host_str()
        .is_some_and(|host| strip_query_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)));
    if strip && url.path().contains("/media/") {
        url.set_query(None);
    }

    Ok(ImageSource::Remote(url))
}

/// Decode the payload of a `data:` URL.
///
/// Base64 payloads are decoded; other payloads are returned as their raw
/// bytes.
pub fn decode_data_url(src: &str) -> Result<Vec<u8>> {
    if !is_data_url(src) {
        return Err(Error::InvalidUrl("not a data URL".into()));
    }
    let rest = &src[5..];
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidUrl("data URL without payload".into()))?;

    if meta.to_ascii_lowercase().ends_with(";base64") {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::ImageDecode(format!("invalid base64 image data: {}", e)))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

fn is_data_url(src: &str) -> bool {
    src.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/articles/case/1?view=full").unwrap()
    }

    fn remote(src: &str) -> String {
        match resolve_image_source(src, Some(&base()), &["epos.myesr.org".to_string()]).unwrap() {
            ImageSource::Remote(url) => url.to_string(),
            ImageSource::Inline(_) => panic!("expected remote source"),
        }
    }

    #[test]
    fn test_absolute_kept() {
        assert_eq!(remote("https://cdn.example.org/x.png"), "https://cdn.example.org/x.png");
    }

    #[test]
    fn test_root_relative_uses_origin() {
        assert_eq!(remote("/media/x.png"), "https://example.com/media/x.png");
    }

    #[test]
    fn test_scheme_relative_uses_page_scheme() {
        assert_eq!(remote("//cdn.example.org/x.png"), "https://cdn.example.org/x.png");
    }

    #[test]
    fn test_relative_resolved_against_page() {
        assert_eq!(remote("img/x.png"), "https://example.com/articles/case/img/x.png");
        assert_eq!(remote("../x.png"), "https://example.com/articles/x.png");
    }

    #[test]
    fn test_media_host_query_stripped() {
        assert_eq!(
            remote("https://epos.myesr.org/media/case/x.jpg?w=300&token=abc"),
            "https://epos.myesr.org/media/case/x.jpg"
        );
        // other paths on the host keep their query
        assert_eq!(
            remote("https://epos.myesr.org/thumb/x.jpg?w=300"),
            "https://epos.myesr.org/thumb/x.jpg?w=300"
        );
        // other hosts keep their query
        assert_eq!(
            remote("https://example.com/media/x.jpg?w=300"),
            "https://example.com/media/x.jpg?w=300"
        );
    }

    #[test]
    fn test_relative_without_base_fails() {
        let result = resolve_image_source("x.png", None, &[]);
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_unsupported_scheme_fails() {
        let result = resolve_image_source("javascript:void(0)", Some(&base()), &[]);
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_data_url_base64() {
        let source = resolve_image_source("data:image/png;base64,AQID", None, &[]).unwrap();
        assert_eq!(source, ImageSource::Inline(vec![1, 2, 3]));
    }

    #[test]
    fn test_data_url_plain() {
        let bytes = decode_data_url("data:image/svg+xml,<svg></svg>").unwrap();
        assert_eq!(bytes, b"<svg></svg>".to_vec());
        assert!(decode_data_url("data:image/png;base64").is_err());
    }
}
