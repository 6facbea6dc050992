//! Network fetcher over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::response::FetchResponse;
use crate::traits::Fetch;

/// Media types offered when fetching schemas.
pub const ACCEPT: &str = "text/turtle, application/ld+json;q=0.9, */*;q=0.1";

const USER_AGENT: &str = concat!("shapetree/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &Url) -> FetchResult<FetchResponse> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            tracing::warn!(url = %url, status, "fetch failed");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let final_url = response.url().clone();
        let body = response.bytes().await?;
        tracing::debug!(url = %url, status, bytes = body.len(), "fetched");
        Ok(FetchResponse::new(final_url, status, headers, body))
    }
}
