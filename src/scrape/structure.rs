//! Structural signals: title, description, headings, links, images,
//! author and date bylines, JSON-LD blocks.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;

use super::{Degradation, Extracted};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub alt: String,
    pub src: String,
}

/// Everything the structural pass pulls out of a document.
#[derive(Debug, Clone, Default)]
pub struct PageStructure {
    pub title: String,
    pub description: String,
    pub headings: Vec<String>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub structured_data: Vec<Value>,
}

/// One step of a first-match scan: look at the first element hit by `selector`
/// and take the first non-empty attribute from `attributes`, else its text.
pub struct ExtractionRule {
    selector: Selector,
    attributes: &'static [&'static str],
}

impl ExtractionRule {
    fn new(selector: &str, attributes: &'static [&'static str]) -> Self {
        Self {
            selector: Selector::parse(selector).expect("Failed to parse extraction rule selector"),
            attributes,
        }
    }

    fn apply(&self, document: &Html) -> Option<String> {
        let element = document.select(&self.selector).next()?;

        let value = self
            .attributes
            .iter()
            .filter_map(|name| element.value().attr(name))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| element_text(element));

        (!value.is_empty()).then_some(value)
    }
}

/// Evaluate rules in order and stop at the first one yielding a value.
pub fn first_match(document: &Html, rules: &[ExtractionRule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(document))
}

static AUTHOR_RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    vec![
        ExtractionRule::new(r#"meta[name="author"]"#, &["content"]),
        ExtractionRule::new(r#"meta[property="article:author"]"#, &["content"]),
        ExtractionRule::new(".author", &["content"]),
        ExtractionRule::new(".byline", &["content"]),
        ExtractionRule::new(r#"[rel="author"]"#, &["content"]),
        ExtractionRule::new(r#"[itemprop="author"]"#, &["content"]),
    ]
});

static DATE_RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    vec![
        ExtractionRule::new(r#"meta[name="date"]"#, &["content", "datetime"]),
        ExtractionRule::new(
            r#"meta[property="article:published_time"]"#,
            &["content", "datetime"],
        ),
        ExtractionRule::new("time", &["content", "datetime"]),
        ExtractionRule::new(r#"[itemprop="datePublished"]"#, &["content", "datetime"]),
        ExtractionRule::new(".published-date", &["content", "datetime"]),
        ExtractionRule::new(".post-date", &["content", "datetime"]),
    ]
});

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to parse title selector"));
static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"]"#).expect("Failed to parse description selector")
});
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6").expect("Failed to parse heading selector")
});
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Failed to parse link selector"));
static IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("Failed to parse image selector"));
static JSON_LD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("Failed to parse JSON-LD selector")
});

pub fn extract_structure(document: &Html) -> Extracted<PageStructure> {
    let structured = extract_structured_data(document);

    let structure = PageStructure {
        title: extract_title(document),
        description: extract_description(document),
        headings: extract_headings(document),
        links: extract_links(document),
        images: extract_images(document),
        author: extract_author(document),
        published_date: extract_published_date(document),
        structured_data: structured.value,
    };

    Extracted {
        value: structure,
        degradations: structured.degradations,
    }
}

pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

pub fn extract_description(document: &Html) -> String {
    document
        .select(&DESCRIPTION_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string()
}

pub fn extract_headings(document: &Html) -> Vec<String> {
    document.select(&HEADING_SELECTOR).map(element_text).collect()
}

pub fn extract_links(document: &Html) -> Vec<Link> {
    document
        .select(&LINK_SELECTOR)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            is_navigable_href(href).then(|| Link {
                text: element_text(el),
                url: href.to_string(),
            })
        })
        .collect()
}

fn is_navigable_href(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty()
        && !href.starts_with('#')
        && !href.to_ascii_lowercase().starts_with("javascript:")
}

pub fn extract_images(document: &Html) -> Vec<Image> {
    document
        .select(&IMAGE_SELECTOR)
        .filter_map(|el| {
            let src = el.value().attr("src").filter(|s| !s.is_empty())?;
            Some(Image {
                alt: el.value().attr("alt").unwrap_or_default().to_string(),
                src: src.to_string(),
            })
        })
        .collect()
}

pub fn extract_author(document: &Html) -> Option<String> {
    first_match(document, &AUTHOR_RULES)
}

pub fn extract_published_date(document: &Html) -> Option<String> {
    first_match(document, &DATE_RULES)
}

/// Parse each JSON-LD block on its own; a bad block never spoils the others.
pub fn extract_structured_data(document: &Html) -> Extracted<Vec<Value>> {
    let mut blocks = Vec::new();
    let mut degradations = Vec::new();

    for (index, el) in document.select(&JSON_LD_SELECTOR).enumerate() {
        let raw: String = el.text().collect();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => blocks.push(value),
            Err(e) => degradations.push(Degradation::MalformedStructuredData {
                index,
                error: e.to_string(),
            }),
        }
    }

    Extracted {
        value: blocks,
        degradations,
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
