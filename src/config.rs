//! Server configuration
//!
//! Loaded from environment variables with sensible defaults:
//! `WIRECHAT_HOST`, `WIRECHAT_PORT`, `WIRECHAT_BATCH_SIZE`,
//! `WIRECHAT_MAIN_CHAT`.

use std::env;

/// Runtime configuration for the server
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Upper bound on messages returned per poll
    pub batch_size: usize,
    /// Name of the always-present broadcast chat
    pub main_chat_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            batch_size: 20,
            main_chat_name: "main".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("WIRECHAT_HOST").unwrap_or(defaults.host),
            port: env::var("WIRECHAT_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            batch_size: env::var("WIRECHAT_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.batch_size),
            main_chat_name: env::var("WIRECHAT_MAIN_CHAT").unwrap_or(defaults.main_chat_name),
        }
    }

    /// Bind address in `host:port` form
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
