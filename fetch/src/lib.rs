//! One-shot text fetching for the timing probe.
//!
//! The probe only needs "GET this URL, give me the body as text". It treats the
//! result as opaque: headers, redirects and content type are not interpreted. A
//! non-success status is still a failure.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`http`] | [`HttpFetcher`]: one shared `reqwest::Client`, built once |
//! | `scripted` | [`ScriptedFetcher`]: fixed body after fixed latency (feature `test-support`) |
//!
//! # The fetch future
//!
//! [`Fetcher::fetch`] returns a `'static` boxed future. The caller can create
//! it in one place and move it into a spawned task. The probe relies on that to
//! split work at its suspension point.

mod http;
#[cfg(feature = "test-support")]
mod scripted;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use url::Url;

pub use http::HttpFetcher;
#[cfg(feature = "test-support")]
pub use scripted::ScriptedFetcher;

/// Future returned by [`Fetcher::fetch`].
pub type FetchFut = Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'static>>;

/// Source of response bodies.
///
/// Implementations must be cheap to share across tasks. They are held as
/// `Arc<dyn Fetcher>` and may serve concurrent fetches.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> FetchFut;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} timed out")]
    Timeout { url: Url },
    #[error("request to {url} failed: {source}")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: Url, status: u16 },
}

impl FetchError {
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        match self {
            FetchError::Client(_) => None,
            FetchError::Timeout { url }
            | FetchError::Network { url, .. }
            | FetchError::Status { url, .. } => Some(url),
        }
    }
}
