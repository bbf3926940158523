use crate::error::{Result, ScoutError};
use crate::scrapers::traits::{FetchResponse, PageFetcher};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// casa.sapo.pt fetcher over plain HTTP
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!("casa.sapo returned status: {}", response.status());
            return Ok(FetchResponse::Failed {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(ScoutError::Fetch)?;
        debug!("Downloaded {} bytes of HTML", body.len());

        Ok(FetchResponse::Page(body.to_vec()))
    }

    fn source_name(&self) -> &'static str {
        "casa.sapo"
    }
}
