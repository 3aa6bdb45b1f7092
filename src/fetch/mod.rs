//! Resource fetching for page HTML and image bytes.
//!
//! The conversion pipeline only needs a fetch-by-URL capability, expressed
//! by the [`ResourceFetcher`] trait. [`HttpFetcher`] talks to the network
//! (directly or through a CORS-bypass proxy that takes the target as a
//! `url` query parameter), and [`MemoryFetcher`] serves pre-loaded bytes
//! for offline conversion and tests.
//!
//! Fetches are blocking and issued one at a time in document order. No
//! retry is attempted.

mod http;
mod memory;
mod resolve;

pub use http::{HttpFetcher, DEFAULT_PROXY_URL, DEFAULT_USER_AGENT};
pub use memory::MemoryFetcher;
pub use resolve::{decode_data_url, resolve_image_source, ImageSource};

use crate::error::Result;
use std::time::Duration;
use url::Url;

/// Bytes returned for a URL, with the content type reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// Response body
    pub bytes: Vec<u8>,

    /// `Content-Type` header value, if any
    pub content_type: Option<String>,
}

impl FetchedResource {
    /// Create a resource from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: None,
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Decode the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Fetch-by-URL capability used by the converter.
pub trait ResourceFetcher {
    /// Fetch the body for an absolute URL.
    fn fetch(&self, url: &Url) -> Result<FetchedResource>;

    /// Fetch the body for an absolute URL and decode it as text.
    fn fetch_text(&self, url: &Url) -> Result<String> {
        Ok(self.fetch(url)?.text())
    }
}

impl<F: ResourceFetcher + ?Sized> ResourceFetcher for &F {
    fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        (**self).fetch(url)
    }
}

/// Options for network fetching.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Proxy endpoint; requests go to `<proxy>?url=<target>` when set
    pub proxy: Option<Url>,

    /// `User-Agent` header sent on direct requests
    pub user_agent: String,

    /// Per-request timeout (None = wait indefinitely)
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// Create new fetch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every request through a proxy endpoint.
    pub fn with_proxy(mut self, proxy: Url) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}
