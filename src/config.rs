//! Process-wide configuration read from the environment at start.
//!
//! DESIGN
//! ======
//! One immutable `Config` value is built by the host and passed down to the
//! gateway, session store and mock backend. Nothing below this module reads
//! environment variables on its own.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 3000;
const DEFAULT_MOCK_DELAY_MS: u64 = 1000;

/// Runtime configuration for the dashboard core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL without a trailing slash.
    pub backend_url: String,
    /// Directory holding the file-backed durable store.
    pub data_dir: PathBuf,
    /// Upper bound on the `/health` probe.
    pub health_timeout: Duration,
    /// Simulated latency of the in-process mock backend.
    pub mock_delay: Duration,
}

impl Config {
    /// Build configuration from `SECKAV_*` environment variables.
    ///
    /// - `SECKAV_BACKEND_URL`: backend base URL (default `http://localhost:3000`)
    /// - `SECKAV_DATA_DIR`: durable storage directory (default `<tmp>/seckav`)
    /// - `SECKAV_HEALTH_TIMEOUT_MS`: health probe bound (default 3000)
    /// - `SECKAV_MOCK_DELAY_MS`: mock backend latency (default 1000)
    #[must_use]
    pub fn from_env() -> Self {
        let backend_url = std::env::var("SECKAV_BACKEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
        let data_dir = std::env::var("SECKAV_DATA_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(default_data_dir, PathBuf::from);

        Self {
            backend_url: normalize_base_url(&backend_url),
            data_dir,
            health_timeout: Duration::from_millis(env_parse("SECKAV_HEALTH_TIMEOUT_MS", DEFAULT_HEALTH_TIMEOUT_MS)),
            mock_delay: Duration::from_millis(env_parse("SECKAV_MOCK_DELAY_MS", DEFAULT_MOCK_DELAY_MS)),
        }
    }

    /// Configuration pointing at `backend_url` with every other value defaulted.
    #[must_use]
    pub fn with_backend_url(backend_url: &str) -> Self {
        Self { backend_url: normalize_base_url(backend_url), ..Self::default() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            data_dir: default_data_dir(),
            health_timeout: Duration::from_millis(DEFAULT_HEALTH_TIMEOUT_MS),
            mock_delay: Duration::from_millis(DEFAULT_MOCK_DELAY_MS),
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::temp_dir().join("seckav")
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
