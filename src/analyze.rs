//! One analysis request end to end: validate, scrape, score.

use std::time::Instant;
use url::Url;

use crate::api::models::{AnalysisResponse, PageMetadata};
use crate::error::{AppError, Result};
use crate::llm::{Scorer, ScoringRequest};
use crate::scrape::{Fetcher, scrape_webpage};

/// A validated analysis target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    /// The caller's input, trimmed. Echoed back in the response.
    pub requested: String,
    pub url: Url,
}

/// Turn the caller's raw input into an absolute http(s) URL.
pub fn parse_target_url(raw: Option<&str>) -> Result<TargetUrl> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(AppError::Validation("URL is required".to_string()));
    }

    let url = Url::parse(raw).map_err(|e| AppError::Validation(format!("Invalid URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    Ok(TargetUrl {
        requested: raw.to_string(),
        url,
    })
}

/// Scrape `target` and have `scorer` rate it. All-or-nothing: any failure
/// discards whatever was extracted so far.
pub async fn analyze_url(
    fetcher: &dyn Fetcher,
    scorer: &dyn Scorer,
    target: &TargetUrl,
) -> Result<AnalysisResponse> {
    let start = Instant::now();
    let url = &target.url;

    let extracted = scrape_webpage(fetcher, url).await?;
    let request = ScoringRequest::from_page(url.as_str(), &extracted.value);

    tracing::info!(%url, "Scoring page");
    let score_start = Instant::now();
    let report = scorer.score(&request).await?;
    tracing::info!(
        %url,
        overall = report.overall_score,
        scoring_elapsed = ?score_start.elapsed(),
        total_elapsed = ?start.elapsed(),
        "Analysis complete"
    );

    Ok(AnalysisResponse::new(
        &target.requested,
        report,
        PageMetadata::from_extracted(&extracted),
    ))
}
