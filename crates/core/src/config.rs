use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://deckofcardsapi.com/api/deck";
pub const DEFAULT_DRAW_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

pub const ENV_API_URL: &str = "DECKDRAW_API_URL";
pub const ENV_DRAW_INTERVAL_MS: &str = "DECKDRAW_DRAW_INTERVAL_MS";
pub const ENV_TIMEOUT_MS: &str = "DECKDRAW_TIMEOUT_MS";
pub const ENV_MODE: &str = "DECKDRAW_MODE";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// One card per press.
    #[default]
    Manual,
    /// A repeating timer draws until stopped or the deck runs out.
    Auto,
}

impl DrawMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" | "draw" => Some(Self::Manual),
            "auto" | "timer" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api_base_url: String,
    pub draw_interval: Duration,
    pub request_timeout: Duration,
    pub mode: DrawMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            draw_interval: Duration::from_millis(DEFAULT_DRAW_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            mode: DrawMode::Manual,
        }
    }
}

impl SessionConfig {
    /// Build from an environment-style lookup. Unset or unparsable values
    /// keep their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL).filter(|value| !value.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(ms) = lookup(ENV_DRAW_INTERVAL_MS).and_then(|value| parse_millis(&value)) {
            config.draw_interval = ms;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS).and_then(|value| parse_millis(&value)) {
            config.request_timeout = ms;
        }
        if let Some(mode) = lookup(ENV_MODE).and_then(|value| DrawMode::parse(&value)) {
            config.mode = mode;
        }
        config
    }
}

fn parse_millis(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_public_service() {
        let config = SessionConfig::from_vars(lookup(&[]));
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.draw_interval, Duration::from_secs(1));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn overrides_from_vars() {
        let config = SessionConfig::from_vars(lookup(&[
            (ENV_API_URL, "http://127.0.0.1:9000/api/deck/"),
            (ENV_DRAW_INTERVAL_MS, "250"),
            (ENV_TIMEOUT_MS, "500"),
            (ENV_MODE, "Auto"),
        ]));
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000/api/deck");
        assert_eq!(config.draw_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_millis(500));
        assert_eq!(config.mode, DrawMode::Auto);
    }

    #[test]
    fn rejects_zero_and_garbage_intervals() {
        let config = SessionConfig::from_vars(lookup(&[
            (ENV_DRAW_INTERVAL_MS, "0"),
            (ENV_TIMEOUT_MS, "soon"),
            (ENV_MODE, "sideways"),
        ]));
        assert_eq!(config, SessionConfig::default());
    }
}
