use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::structure::Link;

pub const WORDS_PER_MINUTE: usize = 200;

/// Quality signals derived from already-extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSignals {
    pub word_count: usize,
    pub reading_time_minutes: usize,
    pub has_author_info: bool,
    pub has_dates: bool,
    pub has_references: bool,
    pub has_schema: bool,
}

impl PageSignals {
    pub fn derive(
        plain_text: &str,
        author: Option<&str>,
        published_date: Option<&str>,
        links: &[Link],
        structured_data: &[Value],
    ) -> Self {
        let word_count = word_count(plain_text);

        Self {
            word_count,
            reading_time_minutes: reading_time_minutes(word_count),
            has_author_info: author.is_some_and(|a| !a.is_empty()),
            has_dates: published_date.is_some_and(|d| !d.is_empty()),
            has_references: links.iter().any(|link| is_web_reference(&link.url)),
            has_schema: !structured_data.is_empty(),
        }
    }
}

/// Whitespace-delimited tokens; runs of whitespace never produce empty words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn reading_time_minutes(word_count: usize) -> usize {
    word_count.div_ceil(WORDS_PER_MINUTE)
}

fn is_web_reference(href: &str) -> bool {
    Url::parse(href.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(url: &str) -> Link {
        Link {
            text: String::new(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_word_count_ignores_whitespace_runs() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("  one   two\nthree\t"), 3);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let four_hundred = vec!["word"; 400].join(" ");
        assert_eq!(reading_time_minutes(word_count(&four_hundred)), 2);
        assert_eq!(reading_time_minutes(word_count("single")), 1);
        assert_eq!(reading_time_minutes(201), 2);
        assert_eq!(reading_time_minutes(0), 0);
    }

    #[test]
    fn test_presence_flags() {
        let signals = PageSignals::derive(
            "some text here",
            Some("Jane"),
            None,
            &[link("/relative"), link("mailto:hi@example.com")],
            &[],
        );
        assert!(signals.has_author_info);
        assert!(!signals.has_dates);
        assert!(!signals.has_references);
        assert!(!signals.has_schema);
        assert_eq!(signals.word_count, 3);
        assert_eq!(signals.reading_time_minutes, 1);

        let signals = PageSignals::derive(
            "",
            Some(""),
            Some("2024-01-01"),
            &[link("/relative"), link("HTTPS://example.org/paper")],
            &[json!({"@type": "Article"})],
        );
        assert!(!signals.has_author_info);
        assert!(signals.has_dates);
        assert!(signals.has_references);
        assert!(signals.has_schema);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let links = [link("http://a.example")];
        let first = PageSignals::derive("a b c", None, None, &links, &[]);
        let second = PageSignals::derive("a b c", None, None, &links, &[]);
        assert_eq!(first, second);
    }
}
