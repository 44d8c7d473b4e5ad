use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::report::AnalysisReport;
use crate::scrape::ScrapedPage;

/// Characters of page text sent to the model.
pub const MAX_CONTENT_CHARS: usize = 15_000;
/// Characters of page text quoted inline in the prompt.
pub const CONTENT_PREVIEW_CHARS: usize = 3_000;
pub const MAX_HEADINGS: usize = 20;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("API key for the scoring service is missing. Please set {0} in your environment.")]
    MissingCredential(&'static str),

    #[error("Scoring service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Scoring service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Scoring response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Scoring response does not match the report shape: {0}")]
    InvalidShape(String),

    #[error("Score {field} out of range: {value}")]
    ScoreOutOfRange { field: &'static str, value: i64 },
}

/// Signals of one page, bounded to what the model accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    pub url: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub headings: Vec<String>,
    pub has_author_info: bool,
    pub author: Option<String>,
    pub has_dates: bool,
    pub date_published: Option<String>,
    pub has_references: bool,
    pub has_schema: bool,
    pub word_count: usize,
    pub reading_time: usize,
    pub image_count: usize,
}

impl ScoringRequest {
    pub fn from_page(url: &str, page: &ScrapedPage) -> Self {
        let signals = page.signals();

        Self {
            url: url.to_string(),
            title: page.title().to_string(),
            description: page.description().to_string(),
            content: truncate_chars(page.plain_text(), MAX_CONTENT_CHARS).to_string(),
            headings: page.headings().iter().take(MAX_HEADINGS).cloned().collect(),
            has_author_info: signals.has_author_info,
            author: page.author().map(str::to_string),
            has_dates: signals.has_dates,
            date_published: page.published_date().map(str::to_string),
            has_references: signals.has_references,
            has_schema: signals.has_schema,
            word_count: signals.word_count,
            reading_time: signals.reading_time_minutes,
            image_count: page.images().len(),
        }
    }
}

/// Anything that can turn a scoring request into a report.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, request: &ScoringRequest) -> Result<AnalysisReport, ScoringError>;
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Scorer backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiScorer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiScorer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
        })
    }

    async fn complete(&self, api_key: &str, prompt: String) -> Result<String, ScoringError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".into(),
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: "json_object".into(),
            },
        };

        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ScoringError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = res
            .json()
            .await
            .map_err(|e| ScoringError::InvalidJson(format!("unreadable completion envelope: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScoringError::InvalidShape("completion has no message content".to_string()))
    }
}

#[async_trait]
impl Scorer for OpenAiScorer {
    async fn score(&self, request: &ScoringRequest) -> Result<AnalysisReport, ScoringError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ScoringError::MissingCredential(API_KEY_VAR))?;

        let prompt = build_prompt(request);
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Requesting EEAT analysis");

        let text = self.complete(api_key, prompt).await?;
        parse_report(&text)
    }
}

/// Parse and bounds-check the model's JSON answer.
pub fn parse_report(text: &str) -> Result<AnalysisReport, ScoringError> {
    let json = strip_code_fence(text);

    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ScoringError::InvalidJson(e.to_string()))?;
    let mut report: AnalysisReport =
        serde_json::from_value(value).map_err(|e| ScoringError::InvalidShape(e.to_string()))?;

    if let Some(&(field, value)) = report.out_of_range_scores().first() {
        return Err(ScoringError::ScoreOutOfRange { field, value });
    }

    // Lists are capped at three. Shorter lists are accepted on purpose: the
    // scores stay usable, so a thin list only earns a warning.
    report.truncate_lists();
    if !report.is_complete() {
        tracing::warn!("Scoring response has fewer than three items in some lists");
    }

    Ok(report)
}

/// Models like to wrap JSON in ```json fences even when asked not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(request: &ScoringRequest) -> String {
    let preview = truncate_chars(&request.content, CONTENT_PREVIEW_CHARS);

    format!(
        r#"You are an expert SEO consultant specializing in Google's EEAT (Experience, Expertise, Authoritativeness, Trustworthiness) guidelines, helpful content guidelines, and Search Quality Rater Guidelines.

Analyze this webpage ({url}) based on the following extracted data:

Title: {title}
Description: {description}
Word Count: {word_count}
Reading Time: {reading_time} minutes
Has Author Info: {has_author_info}
Author: {author}
Has Publication Date: {has_dates}
Date Published: {date_published}
Has External References: {has_references}
Has Schema Markup: {has_schema}
Image Count: {image_count}

Headings Structure:
{headings}

Content Preview:
{preview}...

Provide a comprehensive analysis with:

1. Overall score (0-100)
2. EEAT score (0-100) - Evaluate Experience, Expertise, Authoritativeness, and Trustworthiness
3. Helpful content score (0-100) - Evaluate alignment with Google's helpful content guidelines
4. Visual score (0-100) - Evaluate visual presentation and structure

5. EEAT analysis:
   - 3 specific strengths with clear examples from the content
   - 3 specific weaknesses with clear examples from the content
   - 3 specific, actionable recommendations to improve EEAT signals

6. Helpful content analysis:
   - 3 specific strengths with clear examples from the content
   - 3 specific weaknesses with clear examples from the content
   - 3 specific, actionable recommendations to improve helpful content signals

7. Visual analysis:
   - 3 specific strengths related to layout, structure, and readability
   - 3 specific weaknesses related to layout, structure, and readability
   - 3 specific, actionable recommendations to improve visual presentation

Format the response as a JSON object with these exact fields:
{{
  "overallScore": number,
  "eeatScore": number,
  "helpfulContentScore": number,
  "visualScore": number,
  "eeatAnalysis": {{
    "strengths": [string, string, string],
    "weaknesses": [string, string, string],
    "recommendations": [string, string, string]
  }},
  "helpfulContentAnalysis": {{
    "strengths": [string, string, string],
    "weaknesses": [string, string, string],
    "recommendations": [string, string, string]
  }},
  "visualAnalysis": {{
    "strengths": [string, string, string],
    "weaknesses": [string, string, string],
    "recommendations": [string, string, string]
  }}
}}"#,
        url = request.url,
        title = request.title,
        description = request.description,
        word_count = request.word_count,
        reading_time = request.reading_time,
        has_author_info = request.has_author_info,
        author = request.author.as_deref().unwrap_or("Not specified"),
        has_dates = request.has_dates,
        date_published = request.date_published.as_deref().unwrap_or("Not specified"),
        has_references = request.has_references,
        has_schema = request.has_schema,
        image_count = request.image_count,
        headings = request.headings.join("\n"),
        preview = preview,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::extract_page;

    fn report_json() -> String {
        serde_json::to_string(&AnalysisReport::sample()).unwrap()
    }

    #[test]
    fn test_parse_report_round_trips_sample() {
        let report = parse_report(&report_json()).unwrap();
        assert_eq!(report, AnalysisReport::sample());
    }

    #[test]
    fn test_parse_report_accepts_code_fence() {
        let fenced = format!("```json\n{}\n```", report_json());
        assert_eq!(parse_report(&fenced).unwrap(), AnalysisReport::sample());
    }

    #[test]
    fn test_parse_report_rejects_non_json() {
        let err = parse_report("Sure! Here is your analysis: great page.").unwrap_err();
        assert!(matches!(err, ScoringError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_report_rejects_missing_fields() {
        let err = parse_report(r#"{"overallScore": 50, "eeatScore": 40}"#).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidShape(_)));
    }

    #[test]
    fn test_parse_report_rejects_out_of_range_score() {
        let mut value = serde_json::to_value(AnalysisReport::sample()).unwrap();
        value["overallScore"] = serde_json::json!(140);
        let err = parse_report(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::ScoreOutOfRange {
                field: "overallScore",
                value: 140
            }
        ));
    }

    #[test]
    fn test_parse_report_truncates_long_lists() {
        let mut value = serde_json::to_value(AnalysisReport::sample()).unwrap();
        value["eeatAnalysis"]["strengths"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!("A fourth strength"));
        let report = parse_report(&value.to_string()).unwrap();
        assert_eq!(report.eeat_analysis.strengths.len(), 3);
    }

    #[test]
    fn test_parse_report_keeps_short_lists() {
        let mut value = serde_json::to_value(AnalysisReport::sample()).unwrap();
        value["visualAnalysis"]["weaknesses"] = serde_json::json!(["Only one weakness"]);
        let report = parse_report(&value.to_string()).unwrap();
        assert_eq!(report.visual_analysis.weaknesses, ["Only one weakness"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_request_is_bounded() {
        let long_text = "é".repeat(MAX_CONTENT_CHARS + 500);
        let headings: String = (0..30).map(|i| format!("<h2>Heading {}</h2>", i)).collect();
        let html = format!(
            "<html><body>{}<div><p>{}</p></div></body></html>",
            headings, long_text
        );
        let page = extract_page(&html, None).value;

        let request = ScoringRequest::from_page("https://example.com", &page);
        assert_eq!(request.content.chars().count(), MAX_CONTENT_CHARS);
        assert_eq!(request.headings.len(), MAX_HEADINGS);
        assert_eq!(request.headings[0], "Heading 0");
    }

    #[test]
    fn test_prompt_mentions_signals() {
        let page = extract_page(
            r#"<html><head><title>T</title><meta name="author" content="Ann"></head>
               <body><h1>Intro</h1></body></html>"#,
            None,
        )
        .value;
        let request = ScoringRequest::from_page("https://example.com/a", &page);
        let prompt = build_prompt(&request);

        assert!(prompt.contains("Analyze this webpage (https://example.com/a)"));
        assert!(prompt.contains("Author: Ann"));
        assert!(prompt.contains("Date Published: Not specified"));
        assert!(prompt.contains("Headings Structure:\nIntro"));
        assert!(prompt.contains("\"visualAnalysis\": {"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let scorer = OpenAiScorer::new("http://127.0.0.1:9", None, "gpt-4o").unwrap();
        let page = extract_page("<html><body></body></html>", None).value;
        let request = ScoringRequest::from_page("https://example.com", &page);

        let err = scorer.score(&request).await.unwrap_err();
        assert!(matches!(err, ScoringError::MissingCredential(API_KEY_VAR)));
    }
}
