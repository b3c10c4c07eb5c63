//! In-process fetcher with scripted latency.

use std::time::Duration;

use url::Url;

use crate::{FetchError, FetchFut, Fetcher};

/// Answers every fetch with the same outcome after a fixed, non-blocking delay.
///
/// The delay is a `tokio::time::sleep`, so it is a real suspension point and
/// does not occupy a worker thread.
#[derive(Debug, Clone)]
pub struct ScriptedFetcher {
    latency: Duration,
    outcome: Outcome,
}

#[derive(Debug, Clone)]
enum Outcome {
    Body(String),
    Status(u16),
}

impl ScriptedFetcher {
    pub fn ok(body: impl Into<String>, latency: Duration) -> Self {
        Self {
            latency,
            outcome: Outcome::Body(body.into()),
        }
    }

    /// Fail every fetch with `FetchError::Status`.
    pub fn status(status: u16, latency: Duration) -> Self {
        Self {
            latency,
            outcome: Outcome::Status(status),
        }
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, url: &Url) -> FetchFut {
        let latency = self.latency;
        let outcome = self.outcome.clone();
        let url = url.clone();
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            match outcome {
                Outcome::Body(body) => Ok(body),
                Outcome::Status(status) => Err(FetchError::Status { url, status }),
            }
        })
    }
}
