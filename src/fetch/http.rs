//! Blocking HTTP fetcher.

use super::{FetchOptions, FetchedResource, ResourceFetcher};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

/// Local proxy endpoint used by the browser tool.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000/api/fetch";

/// Browser-like agent string; some content hosts refuse unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Network fetcher backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    proxy: Option<Url>,
}

impl HttpFetcher {
    /// Create a fetcher with default options (direct, no timeout).
    pub fn new() -> Result<Self> {
        Self::with_options(&FetchOptions::default())
    }

    /// Create a fetcher from options.
    pub fn with_options(options: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            client,
            proxy: options.proxy.clone(),
        })
    }

    /// URL actually requested for a target, accounting for the proxy.
    pub fn request_url(&self, target: &Url) -> Url {
        match self.proxy {
            Some(ref proxy) => {
                let mut url = proxy.clone();
                url.query_pairs_mut().append_pair("url", target.as_str());
                url
            }
            None => target.clone(),
        }
    }

    /// Whether requests are routed through a proxy.
    pub fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        let request_url = self.request_url(url);
        log::debug!("GET {}", request_url);

        let response = self.client.get(request_url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes()?.to_vec();

        Ok(FetchedResource {
            bytes,
            content_type,
        })
    }
}
