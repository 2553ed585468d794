// tests/common/mod.rs
//
// Scripted collaborators shared by the integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use upsell_analyzer::classify::TextGenerator;
use upsell_analyzer::news::{Article, DateWindow, NewsSource};
use upsell_analyzer::{Analyzer, AnalyzerConfig, ManualClock};

/// Returns the same articles for every query and counts searches.
pub struct StaticSource {
    pub articles: Vec<Article>,
    pub searches: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            searches: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NewsSource for StaticSource {
    async fn search(&self, query: &str, _window: &DateWindow) -> anyhow::Result<Vec<Article>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().expect("poisoned").push(query.to_string());
        Ok(self.articles.clone())
    }
    fn name(&self) -> &'static str {
        "static"
    }
}

/// Every search fails.
pub struct FailingSource;

#[async_trait::async_trait]
impl NewsSource for FailingSource {
    async fn search(&self, _query: &str, _window: &DateWindow) -> anyhow::Result<Vec<Article>> {
        anyhow::bail!("news backend unavailable")
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Fails the first search, then returns `articles` for every later one.
pub struct FlakySource {
    pub articles: Vec<Article>,
    pub searches: AtomicUsize,
}

impl FlakySource {
    pub fn new(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            searches: AtomicUsize::new(0),
        })
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NewsSource for FlakySource {
    async fn search(&self, _query: &str, _window: &DateWindow) -> anyhow::Result<Vec<Article>> {
        if self.searches.fetch_add(1, Ordering::SeqCst) == 0 {
            anyhow::bail!("first batch timed out")
        }
        Ok(self.articles.clone())
    }
    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Replies `reply` to every prompt, except prompts containing `fail_marker`,
/// which fail. Records every prompt it receives.
pub struct ScriptedGenerator {
    pub reply: String,
    pub fail_marker: Option<String>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail_marker: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_on(reply: &str, marker: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail_marker: Some(marker.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("poisoned").clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().expect("poisoned").push(prompt.to_string());
        let fail = self
            .fail_marker
            .as_deref()
            .is_some_and(|m| prompt.contains(m));
        let reply = self.reply.clone();
        Box::pin(async move {
            if fail {
                anyhow::bail!("scripted failure")
            }
            Ok(reply)
        })
    }
    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn article(n: u32, summary: &str) -> Article {
    Article::new(
        format!("Headline {n}"),
        format!("https://news.example/{n}"),
        summary,
        Some("https://www.livemint.com"),
    )
}

/// One keyword (one batch per company), empty allow-list.
pub fn config() -> AnalyzerConfig {
    AnalyzerConfig {
        keywords: vec!["mass hiring".into()],
        allowed_domains: vec![],
        ..AnalyzerConfig::default()
    }
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap(),
    ))
}

pub fn analyzer(
    source: Arc<dyn NewsSource>,
    generator: Arc<dyn TextGenerator>,
    config: AnalyzerConfig,
    clock: Arc<ManualClock>,
) -> Analyzer {
    Analyzer::with_clock(source, generator, config, clock, Duration::from_secs(5))
}
