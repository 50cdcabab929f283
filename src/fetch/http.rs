//! HTTP bulletin source.

use super::{BulletinSource, FetchError, FetchResponse};
use std::time::Duration;

pub const USER_AGENT: &str = concat!("typhoon-tracker/", env!("CARGO_PKG_VERSION"));

/// Fetches the bulletin page over HTTP(S).
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl BulletinSource for HttpSource {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_err)?;

        let status = response.status().as_u16();
        tracing::debug!("Fetched {} with status {}", url, status);

        let body = response.text().await.map_err(map_err)?;

        Ok(FetchResponse { status, body })
    }
}
