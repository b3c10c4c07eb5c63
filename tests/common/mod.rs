//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use probe_engine::{HttpFetcher, MemorySink, Probe, ProbeConfig, ProbeSettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a mock server that answers `GET /` with `body` after `delay`.
pub async fn start_page(body: &str, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

/// Write a config file pointing at `url` and resolve it the way the binary does.
pub fn settings_from_file(dir: &Path, url: &str, blocking_delay_ms: u64) -> ProbeSettings {
    let file = dir.join("config.toml");
    std::fs::write(
        &file,
        format!(
            "[probe]\nurl = \"{url}\"\nblocking_delay_ms = {blocking_delay_ms}\n\n[http]\ntimeout_seconds = 5\n"
        ),
    )
    .unwrap();
    ProbeConfig::load_from(&file).unwrap().resolve().unwrap()
}

/// Probe over real HTTP, recording into memory.
pub fn http_probe(settings: &ProbeSettings) -> (Probe, Arc<MemorySink>) {
    let fetcher = HttpFetcher::new(&settings.http).unwrap();
    let sink = Arc::new(MemorySink::new());
    let probe = Probe::new(settings, Arc::new(fetcher), sink.clone());
    (probe, sink)
}
