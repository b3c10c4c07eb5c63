//! Config files as the binary reads them.

use std::time::Duration;

use probe_config::{ConfigError, ProbeConfig};
use probe_engine::ProbeSettings;

use crate::common::settings_from_file;

#[test]
fn file_settings_reach_the_probe() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_from_file(dir.path(), "http://127.0.0.1:9/", 250);
    assert_eq!(settings.url.as_str(), "http://127.0.0.1:9/");
    assert_eq!(settings.blocking_delay, Duration::from_millis(250));
    assert_eq!(settings.http.timeout, Some(Duration::from_secs(5)));
    assert_eq!(settings.head_len, ProbeSettings::default().head_len);
}

#[test]
fn unknown_keys_are_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "[probe]\nurll = \"http://example.com\"\n").unwrap();
    let err = ProbeConfig::load_from(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProbeConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }), "{err}");
}
