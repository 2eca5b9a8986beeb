use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use mosques_core::DEFAULT_CONFIRMATION_THRESHOLD;

use crate::error::{ClientError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_TOKEN_FILE: &str = ".mosques-token";

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub confirmation_threshold: u32,
    pub token_file: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            timeout: DEFAULT_TIMEOUT,
            confirmation_threshold: DEFAULT_CONFIRMATION_THRESHOLD,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let base_url = env::var("MOSQUES_API_URL")
            .map_err(|_| ClientError::Config("MOSQUES_API_URL must be set".into()))?;
        if base_url.trim().is_empty() {
            return Err(ClientError::Config("MOSQUES_API_URL is empty".into()));
        }

        let timeout_secs: u64 = env::var("MOSQUES_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT.as_secs().to_string())
            .parse()
            .map_err(|_| ClientError::Config("MOSQUES_API_TIMEOUT_SECS must be a valid number".into()))?;
        if timeout_secs == 0 {
            return Err(ClientError::Config("MOSQUES_API_TIMEOUT_SECS must be positive".into()));
        }

        let confirmation_threshold = env::var("MOSQUES_CONFIRMATION_THRESHOLD")
            .unwrap_or_else(|_| DEFAULT_CONFIRMATION_THRESHOLD.to_string())
            .parse()
            .map_err(|_| {
                ClientError::Config("MOSQUES_CONFIRMATION_THRESHOLD must be a valid number".into())
            })?;

        let token_file = env::var("MOSQUES_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_FILE));

        Ok(Self {
            base_url: normalize_base_url(base_url),
            timeout: Duration::from_secs(timeout_secs),
            confirmation_threshold,
            token_file,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_confirmation_threshold(mut self, threshold: u32) -> Self {
        self.confirmation_threshold = threshold;
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    /// Join an API path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
