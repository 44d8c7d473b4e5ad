pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod report;
pub mod scrape;

use std::sync::Arc;

use config::{Config, FetchMode};
use error::{AppError, Result};
use llm::{OpenAiScorer, Scorer};
use scrape::{BrowserFetcher, Fetcher, HttpFetcher};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn Fetcher>,
    pub scorer: Arc<dyn Scorer>,
}

impl AppState {
    /// Wire the production fetcher and scorer from `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = match config.fetch_mode {
            FetchMode::Http => Arc::new(
                HttpFetcher::new(config.fetch_timeout)
                    .map_err(|e| AppError::Config(format!("HTTP client init failed: {}", e)))?,
            ),
            FetchMode::Browser => Arc::new(BrowserFetcher::new(
                config.webdriver_url.clone(),
                config.fetch_timeout,
            )),
        };

        let scorer = OpenAiScorer::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        )
        .map_err(|e| AppError::Config(format!("Scoring client init failed: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            scorer: Arc::new(scorer),
        })
    }
}
