use crate::error::{ArtError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-2-1";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(15);
pub const DEFAULT_CACHE_CAPACITY: usize = 32;
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ArtConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub request_timeout: Option<Duration>,
    pub cache_capacity: usize,
    pub port: u16,
}

impl Default for ArtConfig {
    fn default() -> Self {
        ArtConfig {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            port: DEFAULT_PORT,
        }
    }
}

impl ArtConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unparseable numbers keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("API_KEY");
        let endpoint = lookup("INFERENCE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.endpoint);
        let max_attempts = lookup("MAX_ATTEMPTS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_attempts);
        let retry_delay = lookup("RETRY_DELAY_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry_delay);
        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);
        let cache_capacity = lookup("CACHE_CAPACITY")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cache_capacity);
        let port = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        ArtConfig {
            api_key,
            endpoint,
            max_attempts,
            retry_delay,
            request_timeout,
            cache_capacity,
            port,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_retry_policy(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// The bearer credential, or `MissingCredential` when it is absent or blank.
    pub fn credential(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ArtError::MissingCredential),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.credential()?;

        if self.endpoint.trim().is_empty() {
            return Err(ArtError::ConfigError("inference endpoint is empty".into()));
        }
        if self.max_attempts == 0 {
            return Err(ArtError::ConfigError(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
