use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use fantoccini::{Client, ClientBuilder};
use reqwest::ClientBuilder as HttpClientBuilder;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Desktop Chrome identifier, enough to get past naive bot filters.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch webpage: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Browser session error: {0}")]
    Browser(String),
}

/// Raw material handed to the extractors.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    /// Base64-encoded PNG, only produced by browser fetches.
    pub screenshot: Option<String>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Plain HTTP GET with a browser user agent.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = HttpClientBuilder::new()
            .user_agent(BROWSER_USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client, timeout })
    }

    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();

        // The bound covers headers and body, so a slow-drip response cannot hang us.
        let html = tokio::time::timeout(self.timeout, self.get(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        tracing::debug!(%url, bytes = html.len(), elapsed = ?start.elapsed(), "HTTP fetch complete");
        Ok(FetchedPage {
            html,
            screenshot: None,
        })
    }
}

/// Least time a browser session gets to shut down once the fetch budget is spent.
pub const CLOSE_GRACE: Duration = Duration::from_millis(750);

/// Renders the page in a WebDriver-controlled headless Chrome and captures a screenshot.
pub struct BrowserFetcher {
    webdriver_url: String,
    timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(webdriver_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            timeout,
        }
    }

    fn capabilities() -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({
                "args": [
                    "--headless=new",
                    "--disable-gpu",
                    "--no-sandbox",
                    format!("--user-agent={BROWSER_USER_AGENT}"),
                ]
            }),
        );
        caps
    }

    async fn capture(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
        client
            .goto(url.as_str())
            .await
            .map_err(|e| FetchError::Browser(format!("navigation failed: {e}")))?;

        let html = client
            .source()
            .await
            .map_err(|e| FetchError::Browser(format!("could not read page source: {e}")))?;

        let png = client
            .screenshot()
            .await
            .map_err(|e| FetchError::Browser(format!("screenshot failed: {e}")))?;

        Ok(FetchedPage {
            html,
            screenshot: Some(STANDARD.encode(png)),
        })
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;

        let mut builder = ClientBuilder::native();
        builder.capabilities(Self::capabilities());

        let client = tokio::time::timeout_at(deadline, builder.connect(&self.webdriver_url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
            .map_err(|e| FetchError::Browser(format!("could not start session: {e}")))?;

        let result = tokio::time::timeout_at(deadline, Self::capture(&client, url)).await;

        // Session must be released whatever happened above.
        close_session(client, deadline, url).await;

        let page = result.map_err(|_| FetchError::Timeout(self.timeout))??;
        tracing::debug!(%url, bytes = page.html.len(), elapsed = ?start.elapsed(), "Browser fetch complete");
        Ok(page)
    }
}

/// Close gets the rest of the fetch budget, but never less than [`CLOSE_GRACE`].
async fn close_session(client: Client, deadline: tokio::time::Instant, url: &Url) {
    let budget = deadline
        .saturating_duration_since(tokio::time::Instant::now())
        .max(CLOSE_GRACE);

    match tokio::time::timeout(budget, client.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(%url, "Failed to close browser session: {}", e),
        Err(_) => tracing::warn!(%url, "Timed out closing browser session after {:?}", budget),
    }
}
