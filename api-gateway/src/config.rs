//! Gateway configuration

use anyhow::Result;
use promptquest_progress::ProgressConfig;
use serde::{Deserialize, Serialize};

/// API gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Capacity of the WebSocket event channel
    pub event_buffer: usize,
    /// Progress store settings
    pub progress: ProgressConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            event_buffer: 1000,
            progress: ProgressConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment and `.env`
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self {
            progress: ProgressConfig::load()?,
            ..Self::default()
        };

        // Platform-provided PORT, overridable by PROMPTQUEST_PORT
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        if let Ok(host) = std::env::var("PROMPTQUEST_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("PROMPTQUEST_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }
        if let Ok(val) = std::env::var("PROMPTQUEST_EVENT_BUFFER") {
            if let Ok(v) = val.parse::<usize>() {
                cfg.event_buffer = v.max(1);
            }
        }

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
        assert!(!cfg.progress.sync_enabled);
    }
}
