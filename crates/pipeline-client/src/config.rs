use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the transform backend lives and how to authenticate against it.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative endpoints join under it.
    pub base_url: Url,
    /// Bearer token of the current session. `None` means no session yet.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid API URL '{}'", base_url))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads `PIPELINE_API_URL`, `PIPELINE_API_TOKEN` and `PIPELINE_API_TIMEOUT_SECS`,
    /// loading a `.env` file first if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();

        let url = env::var("PIPELINE_API_URL").context("PIPELINE_API_URL is not set")?;
        let mut config = Self::new(&url)?;

        if let Ok(token) = env::var("PIPELINE_API_TOKEN")
            && !token.is_empty()
        {
            config.token = Some(token);
        }

        if let Ok(secs) = env::var("PIPELINE_API_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("Invalid PIPELINE_API_TIMEOUT_SECS '{}'", secs))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Resolves an endpoint path relative to the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint '{}'", path))
    }
}
