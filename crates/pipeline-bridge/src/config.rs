use anyhow::{Result, bail};
use std::env;

/// When the local copy of a deleted node goes away.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Remove locally whatever the backend answered.
    #[default]
    Optimistic,
    /// Remove locally only after the backend confirmed the delete.
    Strict,
}

#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub delete_mode: DeleteMode,
    /// Fetch the graph as soon as the controller starts running.
    /// Hosts turn this off until a session is available.
    pub fetch_on_start: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            delete_mode: DeleteMode::Optimistic,
            fetch_on_start: true,
        }
    }
}

impl SyncConfig {
    /// Reads `PIPELINE_STRICT_DELETE` (`true`/`false`, `1`/`0`).
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();

        let mut config = Self::default();
        if let Ok(value) = env::var("PIPELINE_STRICT_DELETE") {
            config.delete_mode = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => DeleteMode::Strict,
                "0" | "false" | "no" | "" => DeleteMode::Optimistic,
                other => bail!("Invalid PIPELINE_STRICT_DELETE '{}'", other),
            };
        }
        Ok(config)
    }
}
