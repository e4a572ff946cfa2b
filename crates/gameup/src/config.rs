//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use gameup_search::SearchConfig;

/// Environment variable that overrides [`ClientConfig::api_url`].
pub const API_URL_VAR: &str = "GAMEUP_API_URL";

/// Environment variable that overrides [`ClientConfig::storage_path`].
pub const STORAGE_PATH_VAR: &str = "GAMEUP_STORAGE_PATH";

/// Everything [`GameUpClient::connect`](crate::GameUpClient::connect) needs.
///
/// Build one with [`Default`] and the `with_*` setters, or read overrides
/// from the environment with [`from_env`](Self::from_env).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend.
    pub api_url: String,
    /// Where the session token is persisted. `None` uses the platform data
    /// directory.
    pub storage_path: Option<PathBuf>,
    /// Per-request timeout. `None` waits as long as the connection does.
    pub request_timeout: Option<Duration>,
    /// Quiet period before a search query is sent.
    pub search_debounce: Duration,
}

impl ClientConfig {
    /// The backend address used when nothing else is configured.
    pub const DEFAULT_API_URL: &str = "http://localhost:5000";

    /// Defaults, overridden by `GAMEUP_API_URL` and `GAMEUP_STORAGE_PATH`
    /// when they are set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(path) = lookup(STORAGE_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.storage_path = Some(PathBuf::from(path));
        }
        config
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    /// The settings handed to each new search session.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::with_debounce(self.search_debounce)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            storage_path: None,
            request_timeout: None,
            search_debounce: SearchConfig::DEFAULT_DEBOUNCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_points_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert!(config.request_timeout.is_none());
        assert!(config.storage_path.is_none());
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("GAMEUP_API_URL", "https://api.gameup.example "),
            ("GAMEUP_STORAGE_PATH", "/tmp/gameup.json"),
        ]));
        assert_eq!(config.api_url, "https://api.gameup.example");
        assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/gameup.json")));
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let config = ClientConfig::from_lookup(lookup(&[("GAMEUP_API_URL", "  ")]));
        assert_eq!(config.api_url, ClientConfig::DEFAULT_API_URL);
    }

    #[test]
    fn test_setters_chain() {
        let config = ClientConfig::default()
            .with_api_url("http://10.0.0.2:5000")
            .with_request_timeout(Duration::from_secs(10))
            .with_search_debounce(Duration::from_millis(250));
        assert_eq!(config.api_url, "http://10.0.0.2:5000");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.search_config().debounce, Duration::from_millis(250));
    }
}
