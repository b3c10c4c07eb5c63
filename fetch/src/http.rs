//! reqwest-backed fetcher.

use std::time::Duration;

use probe_config::HttpSettings;
use reqwest::{Client, ClientBuilder};
use url::Url;

use crate::{FetchError, FetchFut, Fetcher};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Fetcher over a single `reqwest::Client`.
///
/// The client is read-only after construction. Cloning shares the connection
/// pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let client = client_builder(settings)
            .build()
            .map_err(FetchError::Client)?;
        tracing::debug!(
            user_agent = %settings.user_agent,
            timeout = ?settings.timeout,
            "HTTP client built"
        );
        Ok(Self { client })
    }
}

fn client_builder(settings: &HttpSettings) -> ClientBuilder {
    let mut builder = Client::builder()
        .user_agent(settings.user_agent.clone())
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)));
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    builder
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> FetchFut {
        let client = self.client.clone();
        let url = url.clone();
        Box::pin(async move {
            let response = client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| classify(&url, e))?;

            let status = response.status();
            if !status.is_success() {
                tracing::debug!(%url, status = status.as_u16(), "non-success status");
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            response.text().await.map_err(|e| classify(&url, e))
        })
    }
}

fn classify(url: &Url, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout { url: url.clone() }
    } else {
        FetchError::Network {
            url: url.clone(),
            source: err,
        }
    }
}
