use std::time::Duration;

use crate::errors::CompareError;

/// Protocol version sent with every query.
pub(crate) const PROTOCOL_VERSION: &str = "1.0";

/// Configuration for the bot server protocol client.
#[derive(Clone, Debug)]
pub struct PoeClientConfig {
    /// API key used for bearer auth.
    pub api_key: String,
    /// Base URL the bot name is appended to.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Default HTTP timeout for a whole streamed answer.
    pub timeout: Duration,
}

impl PoeClientConfig {
    /// Creates a config with sensible defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.poe.com/bot/".to_string(),
            timeout: Duration::from_secs(600),
        }
    }

    /// Builds a config from `POE_API_KEY`.
    pub fn from_env() -> Result<Self, CompareError> {
        let api_key = std::env::var("POE_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(CompareError::Config(
                "missing POE_API_KEY for the bot protocol source".into(),
            ));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn bot_url(&self, bot: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_url_joins_without_double_slash() {
        let config = PoeClientConfig::new("k");
        assert_eq!(config.bot_url("claude"), "https://api.poe.com/bot/claude");
        let config = config.base_url("http://localhost:8080");
        assert_eq!(config.bot_url("gpt"), "http://localhost:8080/gpt");
    }
}
