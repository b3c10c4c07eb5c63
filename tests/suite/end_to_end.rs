//! Config file -> HTTP client -> probe, against a local server.

use std::time::Duration;

use probe_engine::{LineStyle, Pattern, handler_context};

use crate::common::{http_probe, settings_from_file, start_page};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_pattern_logs_the_same_head() {
    let body = format!("<!DOCTYPE html>\r\n<html>{}</html>", "z".repeat(80));
    let server = start_page(&body, Duration::from_millis(20)).await;
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_from_file(dir.path(), &format!("{}/", server.uri()), 30);

    for pattern in Pattern::ALL {
        let (probe, sink) = http_probe(&settings);
        let outcome = probe.run(pattern).await;
        let shown = outcome.result.expect("fetch succeeds");
        assert_eq!(shown.chars().count(), 50);
        assert!(shown.starts_with("<!DOCTYPE html><html>zzz"));

        let entries = sink.entries();
        let last = entries.last().unwrap();
        assert_eq!(last.context(), handler_context(pattern));
        assert_eq!(last.message(), shown);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn formatted_lines_follow_the_log_shape() {
    let server = start_page("ok", Duration::ZERO).await;
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_from_file(dir.path(), &format!("{}/", server.uri()), 0);
    let (probe, sink) = http_probe(&settings);
    probe.run(Pattern::Await).await;

    let lines: Vec<String> = sink
        .entries()
        .iter()
        .map(|e| e.line(LineStyle::default()))
        .collect();
    let shapes: Vec<&str> = lines
        .iter()
        .map(|l| l.splitn(3, " / ").nth(2).unwrap())
        .collect();
    assert_eq!(
        shapes,
        [
            "await_clicked() / Begin",
            "fetch_delegated() / Begin",
            "fetch_delegated() / awaiting...",
            "await_clicked() / After call",
            "await_clicked() / awaiting...",
            "fetch_delegated() / ok",
            "await_clicked() / ok",
        ]
    );
    for line in &lines {
        let stamp = line.split(" / ").next().unwrap();
        assert_eq!(stamp.len(), 6, "{line}");
        assert_eq!(&stamp[2..3], ".");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_host_is_reported_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_from_file(dir.path(), "http://127.0.0.1:9/", 0);
    let (probe, sink) = http_probe(&settings);
    let outcome = probe.run(Pattern::SleepAwait).await;
    assert!(!outcome.is_ok());
    let failures = sink
        .entries()
        .iter()
        .filter(|e| e.message().starts_with("Failed: "))
        .count();
    assert!(failures >= 1);
}
