use std::fmt;
use std::time::Duration;

use crate::{ClientError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.giphy.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_VAR: &str = "GIPHY_API_KEY";
const BASE_URL_VAR: &str = "GIPHY_BASE_URL";

/// Connection settings for [`crate::GiphyClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct GiphyConfig {
    pub api_key: String,
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Content rating filter (`g`, `pg`, `pg-13`, `r`). `None` leaves the service default.
    pub rating: Option<String>,
}

impl GiphyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            rating: None,
        }
    }

    /// Reads `GIPHY_API_KEY` and the optional `GIPHY_BASE_URL` from the environment.
    ///
    /// A `.env` file in the working directory (or a parent) is honored.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| dotenvy::var(name).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = var(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ClientError::MissingApiKey)?;
        let mut config = Self::new(api_key.trim());
        if let Some(base_url) = var(BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url.trim().into();
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rating(mut self, rating: Option<impl Into<String>>) -> Self {
        self.rating = rating.map(Into::into);
        self
    }
}

impl fmt::Debug for GiphyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GiphyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("rating", &self.rating)
            .finish()
    }
}
