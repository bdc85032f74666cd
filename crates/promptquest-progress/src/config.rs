//! Progress store configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Progress store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Directory holding the persisted progress keys
    pub data_dir: PathBuf,
    /// Base URL of the PromptQuest API server
    pub api_base_url: String,
    /// Mirror mutations to the API server
    pub sync_enabled: bool,
    /// Per-request timeout for sync calls
    pub request_timeout_secs: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(crate::DEFAULT_DATA_DIR),
            api_base_url: crate::DEFAULT_API_BASE_URL.to_string(),
            sync_enabled: false,
            request_timeout_secs: 10,
        }
    }
}

impl ProgressConfig {
    /// Load configuration from `.env` and `PROMPTQUEST_*` variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Ok(dir) = std::env::var("PROMPTQUEST_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("PROMPTQUEST_API_URL") {
            cfg.api_base_url = url;
        }
        if let Ok(val) = std::env::var("PROMPTQUEST_SYNC_ENABLED") {
            cfg.sync_enabled = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("PROMPTQUEST_REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                cfg.request_timeout_secs = v;
            }
        }

        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
