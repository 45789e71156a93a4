use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::error::{CardError, CardResult};

/// Source of page HTML for a request path.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `path` as served by `host`.
    async fn fetch_html(&self, host: &str, path: &str) -> CardResult<String>;
}

/// `http://<host><path>` for an origin-relative path.
pub fn page_url(host: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("http://{host}{path}")
    } else {
        format!("http://{host}/{path}")
    }
}

/// Fetches pages over plain HTTP from the host the card request arrived on.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> CardResult<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("ogcard/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CardError::fetch(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, host: &str, path: &str) -> CardResult<String> {
        let url = page_url(host, path);
        tracing::debug!(%url, "fetching page");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CardError::fetch(format!("GET {url} failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CardError::fetch(format!("GET {url} returned {status}")));
        }
        resp.text()
            .await
            .map_err(|e| CardError::fetch(format!("reading body of {url} failed: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/page.rs"]
mod tests;
