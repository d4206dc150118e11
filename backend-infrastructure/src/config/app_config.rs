use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{
    RuntimeConfig, DEFAULT_REPEAT_THRESHOLD, DEFAULT_TOP_K, DEFAULT_WINDOW_SECONDS,
};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub window_seconds: u64,
    pub repeat_threshold: usize,
    pub top_k: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            window_seconds: DEFAULT_WINDOW_SECONDS,
            repeat_threshold: DEFAULT_REPEAT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("VIGIL_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.window_seconds == 0 {
            return Err(anyhow!("window_seconds must be greater than 0"));
        }
        if self.repeat_threshold == 0 {
            return Err(anyhow!("repeat_threshold must be greater than 0"));
        }
        if self.top_k == 0 {
            return Err(anyhow!("top_k must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            window_seconds: self.window_seconds,
            repeat_threshold: self.repeat_threshold,
            top_k: self.top_k,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("VIGIL_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("VIGIL_WINDOW_SECONDS") {
            self.window_seconds = value.parse().unwrap_or(self.window_seconds);
        }
        if let Ok(value) = env::var("VIGIL_REPEAT_THRESHOLD") {
            self.repeat_threshold = value.parse().unwrap_or(self.repeat_threshold);
        }
        if let Ok(value) = env::var("VIGIL_TOP_K") {
            self.top_k = value.parse().unwrap_or(self.top_k);
        }
        if let Ok(value) = env::var("VIGIL_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("VIGIL_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        AppConfig::default().validate().expect("defaults valid");
    }

    #[test]
    fn zero_analysis_limits_are_rejected() {
        let mut config = AppConfig::default();
        config.window_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.repeat_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut config = AppConfig::default();
        config.bind_addr = "not-an-addr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_fields_override_defaults() {
        let parsed: AppConfig =
            toml::from_str("window_seconds = 600\nrepeat_threshold = 3\n").expect("parse toml");
        assert_eq!(parsed.window_seconds, 600);
        assert_eq!(parsed.repeat_threshold, 3);
        assert_eq!(parsed.top_k, DEFAULT_TOP_K);
    }
}
