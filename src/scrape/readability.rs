//! Main-content isolation through `dom_smoothie`, a port of Mozilla Readability.
//!
//! The plain text is taken from the cleaned article HTML, so word counts only
//! see what survived cleaning. When the library errors or leaves no text the
//! whole body is used instead and a [`Degradation::ReadabilityFallback`] is
//! recorded.

use dom_smoothie::{Config, Readability};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

use super::{Degradation, Extracted};

const MAX_ELEMENTS_TO_PARSE: usize = 9000;

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Failed to parse body selector"));

/// Elements whose content never counts as visible text.
const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "template", "svg"];
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table", "td",
    "th", "tr", "ul", "br",
];

/// Isolated main content of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Cleaned HTML fragment.
    pub content: String,
    pub plain_text: String,
}

/// Extract the article from `html`, falling back to the body of `document`.
pub fn extract_article(html: &str, document: &Html) -> Extracted<Article> {
    let reason = match readability_pass(html) {
        Ok(article) => return Extracted::clean(article),
        Err(reason) => reason,
    };

    tracing::debug!("Readability pass failed: {}, using <body>", reason);

    Extracted {
        value: body_fallback(document),
        degradations: vec![Degradation::ReadabilityFallback { reason }],
    }
}

/// The library pass alone. The error is the reason it produced nothing usable.
pub fn readability_pass(html: &str) -> Result<Article, String> {
    let cfg = Config {
        max_elements_to_parse: MAX_ELEMENTS_TO_PARSE,
        ..Default::default()
    };

    let mut readability = Readability::new(html, None, Some(cfg)).map_err(|e| e.to_string())?;
    let parsed = readability.parse().map_err(|e| e.to_string())?;

    let content = parsed.content.to_string();
    let fragment = Html::parse_fragment(&content);
    let plain_text = visible_text(fragment.root_element());
    if plain_text.is_empty() {
        return Err("article has no text".to_string());
    }

    Ok(Article {
        content,
        plain_text,
    })
}

fn body_fallback(document: &Html) -> Article {
    match document.select(&BODY_SELECTOR).next() {
        Some(body) => Article {
            content: body.inner_html(),
            plain_text: visible_text(body),
        },
        None => Article {
            content: String::new(),
            plain_text: String::new(),
        },
    }
}

/// Text of `el` without script/style content; block boundaries become line breaks.
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if STRIPPED_TAGS.contains(&name) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
