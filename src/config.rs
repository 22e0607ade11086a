//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chat_api::ChatApiConfig;
use studio_store::STORE_DIR;

pub const HOME_ENV_VAR: &str = "SUBTITLE_STUDIO_HOME";
pub const API_KEY_ENV_VAR: &str = "SUBTITLE_STUDIO_API_KEY";
pub const TIMEOUT_ENV_VAR: &str = "SUBTITLE_STUDIO_TIMEOUT_SECS";
pub const MAX_RETRIES_ENV_VAR: &str = "SUBTITLE_STUDIO_MAX_RETRIES";

#[derive(Clone)]
pub struct EnvConfig {
    pub home: PathBuf,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
    pub max_retries: u32,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            home: env_string_opt(HOME_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".").join(STORE_DIR)),
            api_key: env_string_opt(API_KEY_ENV_VAR).map(|value| value.trim().to_owned()),
            timeout: env_u64_opt(TIMEOUT_ENV_VAR)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            max_retries: env_u64_opt(MAX_RETRIES_ENV_VAR)
                .and_then(|retries| u32::try_from(retries).ok())
                .unwrap_or(0),
        }
    }

    #[must_use]
    pub fn chat_api_config(&self) -> ChatApiConfig {
        let config = ChatApiConfig::new().with_max_retries(self.max_retries);
        match self.timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("home", &self.home)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_u64_opt(key: &str) -> Option<u64> {
    let value = env_string_opt(key)?;
    match value.trim().parse::<u64>() {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            tracing::warn!(key, %error, "ignoring non-numeric environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EnvConfig, API_KEY_ENV_VAR, HOME_ENV_VAR, MAX_RETRIES_ENV_VAR, TIMEOUT_ENV_VAR};
    use std::env;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard(HOME_ENV_VAR, None);
        let _g2 = set_env_guard(API_KEY_ENV_VAR, None);
        let _g3 = set_env_guard(TIMEOUT_ENV_VAR, None);
        let _g4 = set_env_guard(MAX_RETRIES_ENV_VAR, None);

        let config = EnvConfig::from_env();
        assert_eq!(config.home, PathBuf::from("./.subtitle_studio"));
        assert!(config.api_key.is_none());
        assert!(config.timeout.is_none());
        assert_eq!(config.max_retries, 0);

        let api = config.chat_api_config();
        assert_eq!(api.max_retries, 0);
        assert!(api.timeout.is_none());
    }

    #[test]
    fn env_values_are_applied() {
        let _lock = env_lock();
        let _g1 = set_env_guard(HOME_ENV_VAR, Some("/tmp/studio"));
        let _g2 = set_env_guard(API_KEY_ENV_VAR, Some(" sk-env "));
        let _g3 = set_env_guard(TIMEOUT_ENV_VAR, Some("30"));
        let _g4 = set_env_guard(MAX_RETRIES_ENV_VAR, Some("2"));

        let config = EnvConfig::from_env();
        assert_eq!(config.home, PathBuf::from("/tmp/studio"));
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_retries, 2);
        assert!(!format!("{config:?}").contains("sk-env"));
    }

    #[test]
    fn blank_and_invalid_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard(API_KEY_ENV_VAR, Some("   "));
        let _g2 = set_env_guard(TIMEOUT_ENV_VAR, Some("0"));
        let _g3 = set_env_guard(MAX_RETRIES_ENV_VAR, Some("many"));

        let config = EnvConfig::from_env();
        assert!(config.api_key.is_none());
        assert!(config.timeout.is_none());
        assert_eq!(config.max_retries, 0);
    }
}
