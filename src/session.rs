use crate::config::config::ApiConfig;
use std::env;
use tracing::debug;

/// Who is talking to the backend and where it lives. Passed explicitly to
/// the API client instead of being read from global storage.
pub trait SessionContext: Send + Sync {
    fn token(&self) -> Option<String>;
    fn base_url(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: Option<String>,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL from the config; token from the environment variable the
    /// config names, if it is set and not blank
    pub fn from_config(config: &ApiConfig) -> Self {
        let token = env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        debug!(
            target: "api",
            "Session for {} (token from ${}: {})",
            config.base_url,
            config.token_env,
            if token.is_some() { "set" } else { "unset" }
        );
        Self {
            base_url: config.base_url.clone(),
            token,
        }
    }
}

impl SessionContext for Session {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_reads_token_env() {
        let config = ApiConfig {
            base_url: "https://fm.example.com/api".to_string(),
            token_env: "TABLE_VIEW_TEST_TOKEN_SESSION".to_string(),
        };

        env::remove_var(&config.token_env);
        let session = Session::from_config(&config);
        assert_eq!(session.base_url(), "https://fm.example.com/api");
        assert_eq!(session.token(), None);

        env::set_var(&config.token_env, "abc123");
        assert_eq!(Session::from_config(&config).token().as_deref(), Some("abc123"));
        env::remove_var(&config.token_env);
    }
}
