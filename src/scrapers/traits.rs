use crate::error::Result;
use async_trait::async_trait;

/// Outcome of asking the site for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResponse {
    /// Raw page bytes from a successful response
    Page(Vec<u8>),
    /// The site answered with a non-success status
    Failed { status: u16 },
}

/// Fetches raw pages for the sync cycle.
/// Retries, redirects and headers belong to the implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;

    /// Get the name of the fetch source
    fn source_name(&self) -> &'static str;
}
