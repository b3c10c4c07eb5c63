//! Configuration for awaitprobe.
//!
//! The on-disk file (`~/.awaitprobe/config.toml`) is deserialized into
//! [`ProbeConfig`], where every field is optional. [`ProbeConfig::resolve`] turns
//! that into [`ProbeSettings`], which has no `Option`s left for core logic to handle.
//!
//! ```toml
//! [probe]
//! url = "https://www.instagram.com/"
//! blocking_delay_ms = 1000
//! head_len = 50
//! show_thread_id = true
//!
//! [http]
//! timeout_seconds = 30
//! user_agent = "awaitprobe/0.0"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_URL: &str = "https://www.instagram.com/";
pub const DEFAULT_BLOCKING_DELAY_MS: u64 = 1000;
/// Characters of a fetch result shown in the log.
pub const DEFAULT_HEAD_LEN: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("awaitprobe/", env!("CARGO_PKG_VERSION"));

/// Upper bound on the simulated blocking delay. Anything longer just freezes the UI.
pub const MAX_BLOCKING_DELAY_MS: u64 = 60_000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    pub probe: Option<ProbeSection>,
    pub http: Option<HttpSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    /// Target of the single GET.
    pub url: Option<String>,
    /// Duration of the simulated non-suspending work.
    pub blocking_delay_ms: Option<u64>,
    /// Characters of the fetched body shown per result line.
    pub head_len: Option<usize>,
    /// Include `T<id>` in formatted lines. Default: true.
    pub show_thread_id: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    /// Whole-request timeout. `0` disables it.
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub url: Url,
    pub blocking_delay: Duration,
    pub head_len: usize,
    pub show_thread_id: bool,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        ProbeConfig::default()
            .resolve()
            .unwrap_or_else(|_| unreachable!("built-in defaults are valid"))
    }
}

impl ProbeConfig {
    /// Load from the default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };
        Self::parse(&content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn resolve(&self) -> Result<ProbeSettings, ConfigError> {
        let probe = self.probe.as_ref();
        let http = self.http.as_ref();

        let raw_url = probe
            .and_then(|p| p.url.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_URL);
        let url = Url::parse(raw_url)
            .map_err(|e| ConfigError::Invalid(format!("probe.url `{raw_url}`: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "probe.url must be http or https, got `{}`",
                url.scheme()
            )));
        }

        let delay_ms = probe
            .and_then(|p| p.blocking_delay_ms)
            .unwrap_or(DEFAULT_BLOCKING_DELAY_MS);
        if delay_ms > MAX_BLOCKING_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "probe.blocking_delay_ms must be at most {MAX_BLOCKING_DELAY_MS}, got {delay_ms}"
            )));
        }

        let head_len = probe
            .and_then(|p| p.head_len)
            .unwrap_or(DEFAULT_HEAD_LEN);
        if head_len == 0 {
            return Err(ConfigError::Invalid("probe.head_len must be positive".into()));
        }

        let timeout = match http.and_then(|h| h.timeout_seconds) {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };
        let user_agent = http
            .and_then(|h| h.user_agent.clone())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(ProbeSettings {
            url,
            blocking_delay: Duration::from_millis(delay_ms),
            head_len,
            show_thread_id: probe.and_then(|p| p.show_thread_id).unwrap_or(true),
            http: HttpSettings {
                timeout,
                user_agent,
            },
        })
    }
}

/// Directory holding the config file and logs.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".awaitprobe"))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
