use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET.
    Http,
    /// Headless browser through WebDriver, with screenshot.
    Browser,
}

impl FromStr for FetchMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(FetchMode::Http),
            "browser" => Ok(FetchMode::Browser),
            other => Err(AppError::Config(format!("Invalid FETCH_MODE: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Checked when scoring, not at startup.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub fetch_timeout: Duration,
    pub fetch_mode: FetchMode,
    pub webdriver_url: String,
    pub preview_mode: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the config from any variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let fetch_timeout = match var("FETCH_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| AppError::Config(format!("Invalid FETCH_TIMEOUT_SECS: {}", secs)))?,
            None => Duration::from_secs(30),
        };

        let fetch_mode = match var("FETCH_MODE") {
            Some(mode) => mode.parse()?,
            None => FetchMode::Http,
        };

        let preview_mode = match var("PREVIEW_MODE") {
            Some(flag) => parse_flag(&flag)?,
            None => false,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openai_api_key: var("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            fetch_timeout,
            fetch_mode,
            webdriver_url: var("WEBDRIVER_URL")
                .unwrap_or_else(|| "http://localhost:4444".to_string()),
            preview_mode,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!("Invalid PREVIEW_MODE: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.openai_model, "gpt-4o");
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.fetch_mode, FetchMode::Http);
        assert!(!config.preview_mode);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("FETCH_MODE", "Browser"),
            ("PREVIEW_MODE", "true"),
        ])
        .unwrap();

        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.fetch_mode, FetchMode::Browser);
        assert!(config.preview_mode);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config_from(&[("PORT", "http")]), Err(AppError::Config(_))));
        assert!(matches!(
            config_from(&[("FETCH_TIMEOUT_SECS", "0")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("FETCH_MODE", "carrier-pigeon")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("PREVIEW_MODE", "maybe")]),
            Err(AppError::Config(_))
        ));
    }
}
