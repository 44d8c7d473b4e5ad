use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::AnalysisReport;
use crate::scrape::{Extracted, ScrapedPage};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Page facts echoed back next to the scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub word_count: usize,
    pub reading_time: usize,
    pub has_author_info: bool,
    pub has_dates: bool,
    pub has_references: bool,
    pub has_schema: bool,
    pub author: Option<String>,
    pub date_published: Option<String>,
    pub image_count: usize,
    /// True when extraction fell back somewhere and quality may be reduced.
    pub degraded: bool,
}

impl PageMetadata {
    pub fn from_extracted(extracted: &Extracted<ScrapedPage>) -> Self {
        let page = &extracted.value;
        let signals = page.signals();

        Self {
            title: page.title().to_string(),
            description: page.description().to_string(),
            word_count: signals.word_count,
            reading_time: signals.reading_time_minutes,
            has_author_info: signals.has_author_info,
            has_dates: signals.has_dates,
            has_references: signals.has_references,
            has_schema: signals.has_schema,
            author: page.author().map(str::to_string),
            date_published: page.published_date().map(str::to_string),
            image_count: page.images().len(),
            degraded: extracted.is_degraded(),
        }
    }

    pub fn sample() -> Self {
        Self {
            title: "Example Website - Homepage".to_string(),
            description: "This is an example website for demonstration purposes.".to_string(),
            word_count: 1250,
            reading_time: 6,
            has_author_info: true,
            has_dates: true,
            has_references: true,
            has_schema: false,
            author: None,
            date_published: None,
            image_count: 0,
            degraded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    pub metadata: PageMetadata,
}

impl AnalysisResponse {
    pub fn new(url: &str, report: AnalysisReport, metadata: PageMetadata) -> Self {
        Self {
            report,
            url: url.to_string(),
            analyzed_at: Utc::now(),
            metadata,
        }
    }

    /// Fixed response used in preview mode; nothing is fetched or scored.
    pub fn preview(url: &str) -> Self {
        Self::new(url, AnalysisReport::sample(), PageMetadata::sample())
    }
}
