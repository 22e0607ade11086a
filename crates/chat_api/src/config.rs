use std::collections::BTreeMap;
use std::time::Duration;

/// Transport configuration shared by every request a client sends.
///
/// Per-request connection data (credential, endpoint, mode) travels with the
/// [`generation_provider::GenerationRequest`] instead.
#[derive(Debug, Clone, Default)]
pub struct ChatApiConfig {
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional whole-request timeout. None means no hard timeout.
    pub timeout: Option<Duration>,
    /// Retries of the initial dispatch for transient failures. Default: 0.
    pub max_retries: u32,
}

impl ChatApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }
}
