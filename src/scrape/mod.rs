//! Page scraping pipeline: fetch, parse, isolate the article, derive signals.

pub mod fetch;
pub mod heuristics;
pub mod readability;
pub mod structure;

use scraper::Html;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use url::Url;

pub use fetch::{BrowserFetcher, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use heuristics::PageSignals;
pub use readability::Article;
pub use structure::{Image, Link, PageStructure};

/// A problem the pipeline absorbed instead of failing on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Content scoring found no article; body text was used instead.
    ReadabilityFallback { reason: String },
    /// A JSON-LD block could not be parsed and was dropped.
    MalformedStructuredData { index: usize, error: String },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::ReadabilityFallback { reason } => {
                write!(f, "readability fallback: {}", reason)
            }
            Degradation::MalformedStructuredData { index, error } => {
                write!(f, "dropped JSON-LD block #{}: {}", index, error)
            }
        }
    }
}

/// A value together with the degradations taken while producing it.
#[derive(Debug, Clone)]
pub struct Extracted<T> {
    pub value: T,
    pub degradations: Vec<Degradation>,
}

impl<T> Extracted<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            degradations: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Everything extracted from one page. Signals are always computed from the
/// other fields, so the only way to build one is [`ScrapedPage::assemble`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPage {
    title: String,
    description: String,
    content: String,
    plain_text: String,
    headings: Vec<String>,
    links: Vec<Link>,
    images: Vec<Image>,
    author: Option<String>,
    published_date: Option<String>,
    structured_data: Vec<Value>,
    screenshot: Option<String>,
    #[serde(flatten)]
    signals: PageSignals,
}

impl ScrapedPage {
    pub fn assemble(structure: PageStructure, article: Article, screenshot: Option<String>) -> Self {
        let signals = PageSignals::derive(
            &article.plain_text,
            structure.author.as_deref(),
            structure.published_date.as_deref(),
            &structure.links,
            &structure.structured_data,
        );

        Self {
            title: structure.title,
            description: structure.description,
            content: article.content,
            plain_text: article.plain_text,
            headings: structure.headings,
            links: structure.links,
            images: structure.images,
            author: structure.author,
            published_date: structure.published_date,
            structured_data: structure.structured_data,
            screenshot,
            signals,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Cleaned HTML of the main content.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn published_date(&self) -> Option<&str> {
        self.published_date.as_deref()
    }

    pub fn structured_data(&self) -> &[Value] {
        &self.structured_data
    }

    pub fn screenshot(&self) -> Option<&str> {
        self.screenshot.as_deref()
    }

    pub fn signals(&self) -> &PageSignals {
        &self.signals
    }
}

/// Run structural and readability extraction over raw HTML.
pub fn extract_page(html: &str, screenshot: Option<String>) -> Extracted<ScrapedPage> {
    let document = Html::parse_document(html);

    let structure = structure::extract_structure(&document);
    let article = readability::extract_article(html, &document);

    let mut degradations = structure.degradations;
    degradations.extend(article.degradations);

    Extracted {
        value: ScrapedPage::assemble(structure.value, article.value, screenshot),
        degradations,
    }
}

/// Fetch `url` once and extract it. Only the fetch can fail.
pub async fn scrape_webpage(
    fetcher: &dyn Fetcher,
    url: &Url,
) -> Result<Extracted<ScrapedPage>, FetchError> {
    tracing::info!(%url, "Fetching page");
    let fetched = fetcher.fetch(url).await?;

    tracing::debug!(%url, bytes = fetched.html.len(), "Extracting page content");
    let extracted = extract_page(&fetched.html, fetched.screenshot);

    for degradation in &extracted.degradations {
        tracing::warn!(%url, "Extraction degraded: {}", degradation);
    }

    let signals = extracted.value.signals();
    tracing::info!(
        %url,
        words = signals.word_count,
        headings = extracted.value.headings().len(),
        links = extracted.value.links().len(),
        "Page extracted"
    );

    Ok(extracted)
}
