//! In-memory fetcher for saved pages and tests.

use super::{FetchedResource, ResourceFetcher};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone)]
enum Entry {
    Found(FetchedResource),
    Status(u16),
}

/// Fetcher that serves pre-loaded resources keyed by absolute URL.
///
/// Unknown URLs fail with [`Error::NotFound`]; URLs registered with
/// [`MemoryFetcher::insert_status`] fail with [`Error::HttpStatus`].
/// Every request is recorded so callers can inspect fetch order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, Entry>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes for a URL.
    pub fn insert(&mut self, url: impl AsRef<str>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(
            normalize(url.as_ref()),
            Entry::Found(FetchedResource::new(bytes.into())),
        );
    }

    /// Register an HTML page for a URL.
    pub fn insert_html(&mut self, url: impl AsRef<str>, html: impl Into<String>) {
        let resource =
            FetchedResource::new(html.into().into_bytes()).with_content_type("text/html");
        self.entries
            .insert(normalize(url.as_ref()), Entry::Found(resource));
    }

    /// Make a URL fail with the given HTTP status.
    pub fn insert_status(&mut self, url: impl AsRef<str>, status: u16) {
        self.entries
            .insert(normalize(url.as_ref()), Entry::Status(status));
    }

    /// Builder form of [`MemoryFetcher::insert`].
    pub fn with(mut self, url: impl AsRef<str>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ResourceFetcher for MemoryFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        self.requests.borrow_mut().push(url.to_string());
        match self.entries.get(url.as_str()) {
            Some(Entry::Found(resource)) => Ok(resource.clone()),
            Some(Entry::Status(status)) => Err(Error::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(Error::NotFound(url.to_string())),
        }
    }
}

// Keys are stored in the serialized form `Url` produces so that
// "https://example.com" and "https://example.com/" match.
fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}
