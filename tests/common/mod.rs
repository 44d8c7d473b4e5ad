#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

use eeat_analyzer::{
    AppState,
    api::routes::create_router,
    config::Config,
    llm::{Scorer, ScoringError, ScoringRequest, parse_report},
    logging::init_tracing,
    report::AnalysisReport,
    scrape::{FetchError, FetchedPage, Fetcher},
};

pub const ARTICLE_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Composting at Home: A Practical Guide</title>
  <meta name="description" content="Everything you need to start composting kitchen scraps.">
  <meta name="author" content="Dana Green">
  <meta property="article:published_time" content="2024-04-12T08:00:00Z">
  <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Article", "headline": "Composting at Home"}</script>
  <script type="application/ld+json">{"broken": </script>
</head>
<body>
  <header class="site-header"><a href="/">Home</a><a href="#main">Skip to content</a></header>
  <nav><a href="/guides">Guides</a><a href="javascript:void(0)">Menu</a></nav>
  <article class="post">
    <h1>Composting at Home</h1>
    <p class="byline">By Someone Else</p>
    <p>Composting turns kitchen scraps, yard trimmings, and paper into rich soil for your garden. A small bin in a shady corner is enough to get started, and within a season the pile becomes dark, crumbly humus.</p>
    <h2>What you need</h2>
    <p>You need a bin, a mix of green and brown material, water, and a little patience each week. Greens are peelings, coffee grounds, and fresh clippings; browns are dry leaves, straw, and shredded cardboard.</p>
    <img src="/img/bin.jpg" alt="A compost bin">
    <p>Keep the pile about as damp as a wrung-out sponge, and turn it with a fork every couple of weeks so air reaches the middle. A pile that smells sour usually needs more browns and more air.</p>
    <h2>Further reading</h2>
    <p>See the <a href="https://www.epa.gov/recycle/composting-home">EPA composting guide</a> for more detail on what to add, what to leave out, and how to use the finished compost in beds and containers.</p>
  </article>
  <footer><p>Copyright 2024 Garden Notes, all rights reserved worldwide.</p></footer>
</body>
</html>"##;

/// Sentences the extracted article text must contain.
pub const ARTICLE_SENTENCES: &[&str] = &[
    "Composting turns kitchen scraps, yard trimmings, and paper into rich soil for your garden.",
    "You need a bin, a mix of green and brown material, water, and a little patience each week.",
    "Keep the pile about as damp as a wrung-out sponge",
    "See the EPA composting guide for more detail on what to add",
];

/// Page chrome that must never reach the article text.
pub const CHROME_TEXT: &[&str] = &["Skip to content", "Guides", "Copyright"];

pub fn init() {
    init_tracing("debug");
}

/// Scorer double: either hands back a fixed report or feeds raw model text
/// through the real response parser.
pub enum StubReply {
    Report(AnalysisReport),
    RawText(String),
}

pub struct StubScorer {
    reply: StubReply,
    pub last_request: Mutex<Option<ScoringRequest>>,
}

impl StubScorer {
    pub fn returning(report: AnalysisReport) -> Self {
        Self {
            reply: StubReply::Report(report),
            last_request: Mutex::new(None),
        }
    }

    pub fn raw(text: &str) -> Self {
        Self {
            reply: StubReply::RawText(text.to_string()),
            last_request: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Scorer for StubScorer {
    async fn score(&self, request: &ScoringRequest) -> Result<AnalysisReport, ScoringError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.reply {
            StubReply::Report(report) => Ok(report.clone()),
            StubReply::RawText(text) => parse_report(text),
        }
    }
}

/// Fetcher that serves a fixed page without touching the network.
pub struct StaticFetcher {
    pub html: String,
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, _url: &Url) -> Result<FetchedPage, FetchError> {
        Ok(FetchedPage {
            html: self.html.clone(),
            screenshot: None,
        })
    }
}

/// Fetcher that must never be reached.
pub struct UnreachableFetcher;

#[async_trait]
impl Fetcher for UnreachableFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        panic!("fetch should not be called for {}", url);
    }
}

pub fn default_config() -> Config {
    Config::from_vars(|_| None).expect("default config")
}

pub fn app_state(fetcher: Arc<dyn Fetcher>, scorer: Arc<dyn Scorer>) -> AppState {
    AppState {
        config: Arc::new(default_config()),
        fetcher,
        scorer,
    }
}

/// Serve the router on an ephemeral port and return its base URL.
pub async fn spawn_app(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, create_router(state))
            .await
            .expect("server");
    });

    format!("http://{}", addr)
}
