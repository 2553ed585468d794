//! # Analysis pipeline
//! Company list + day window → per-company article set → per-article and
//! aggregate classifications. Pure of presentation: the result is a
//! structured [`AnalysisRun`] that the renderer and exporter consume.
//!
//! Companies, batches and articles are processed one at a time. Nothing in
//! here fails per company: adapter and classifier failures degrade to
//! skipped batches and sentinel classifications, so N companies always
//! yield N reports.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::histogram;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};

use crate::cache::{Clock, ResultCache, SystemClock};
use crate::classify::{Classification, DynGenerator, OpportunityClassifier};
use crate::config::analyzer::{AnalyzerConfig, MAX_DAYS_BACK, MIN_DAYS_BACK};
use crate::error::AnalyzerError;
use crate::news::{build_queries, Article, Batcher, DateWindow, NewsSource};

/// Default bound for one text-generation call.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleAnalysis {
    pub article: Article,
    pub classification: Classification,
}

impl ArticleAnalysis {
    /// Title for display; `Article {index}` (1-based) when the feed had none.
    pub fn display_title(&self, index: usize) -> String {
        let t = self.article.title.trim();
        if t.is_empty() {
            format!("Article {index}")
        } else {
            t.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyReport {
    pub company: String,
    pub articles: Vec<ArticleAnalysis>,
    pub overall: Classification,
}

/// One full run over a company list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRun {
    pub window: DateWindow,
    pub days: u32,
    pub max_articles: usize,
    pub domain_count: usize,
    pub generated_at: DateTime<Utc>,
    pub reports: Vec<CompanyReport>,
}

pub struct Analyzer {
    source: Arc<dyn NewsSource>,
    classifier: OpportunityClassifier,
    news_cache: Arc<ResultCache<Vec<Article>>>,
    classify_cache: Arc<ResultCache<String>>,
    config: AnalyzerConfig,
    clock: Arc<dyn Clock>,
}

impl Analyzer {
    pub fn new(source: Arc<dyn NewsSource>, generator: DynGenerator, config: AnalyzerConfig) -> Self {
        Self::with_clock(
            source,
            generator,
            config,
            Arc::new(SystemClock),
            DEFAULT_COMPLETION_TIMEOUT,
        )
    }

    /// Full constructor: the clock drives both cache expiry and the end date
    /// of every search window.
    pub fn with_clock(
        source: Arc<dyn NewsSource>,
        generator: DynGenerator,
        config: AnalyzerConfig,
        clock: Arc<dyn Clock>,
        completion_timeout: Duration,
    ) -> Self {
        let config = config.normalized();
        let ttl = config.cache_ttl();
        let news_cache = Arc::new(ResultCache::new("news", ttl, clock.clone()));
        let classify_cache = Arc::new(ResultCache::new("classify", ttl, clock.clone()));
        Self {
            source,
            classifier: OpportunityClassifier::new(
                generator,
                classify_cache.clone(),
                completion_timeout,
            ),
            news_cache,
            classify_cache,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Evict expired entries and slots left empty by failed calls.
    fn purge_caches(&self) {
        let news = self.news_cache.purge_expired();
        let classify = self.classify_cache.purge_expired();
        if news + classify > 0 {
            debug!(target: "cache", news, classify, "expired entries purged");
        }
    }

    /// Window of `days` ending today; rejects days outside 1..=365.
    pub fn window_for(&self, days: u32) -> Result<DateWindow, AnalyzerError> {
        if !(MIN_DAYS_BACK..=MAX_DAYS_BACK).contains(&days) {
            return Err(AnalyzerError::invalid(format!(
                "days must be between {MIN_DAYS_BACK} and {MAX_DAYS_BACK}, got {days}"
            )));
        }
        Ok(DateWindow::ending_at(self.clock.now().date_naive(), days))
    }

    /// Fetch, classify and aggregate one company.
    pub async fn analyze_company(&self, company: &str, window: &DateWindow) -> CompanyReport {
        let t0 = Instant::now();
        let company = company.trim();

        let queries = build_queries(company, &self.config.keywords);
        let articles = Batcher::new(self.source.as_ref(), &self.news_cache)
            .fetch_all(
                company,
                window,
                self.config.max_articles,
                &queries,
                &self.config.allowed_domains,
            )
            .await;

        let report = if articles.is_empty() {
            CompanyReport {
                company: company.to_string(),
                articles: Vec::new(),
                overall: Classification::no_articles(),
            }
        } else {
            let mut analyses = Vec::with_capacity(articles.len());
            for article in articles {
                let classification = self.classifier.classify_article(company, &article).await;
                analyses.push(ArticleAnalysis {
                    article,
                    classification,
                });
            }
            let results: Vec<Classification> =
                analyses.iter().map(|a| a.classification.clone()).collect();
            let overall = self.classifier.classify_aggregate(company, &results).await;
            CompanyReport {
                company: company.to_string(),
                articles: analyses,
                overall,
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("pipeline_company_ms").record(ms);
        let failures = report
            .articles
            .iter()
            .filter(|a| a.classification.is_failure())
            .count();
        info!(
            target: "pipeline",
            company,
            articles = report.articles.len(),
            failures,
            level = %report.overall.level,
            ms = ms as u64,
            "company analysed"
        );
        report
    }

    /// Analyse every company in order over the last `days` days.
    pub async fn run(&self, companies: &[String], days: u32) -> Result<AnalysisRun, AnalyzerError> {
        let window = self.window_for(days)?;
        let companies: Vec<&str> = companies
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if companies.is_empty() {
            return Err(AnalyzerError::invalid("no company names provided"));
        }
        self.purge_caches();

        info!(
            target: "pipeline",
            companies = companies.len(),
            from = %window.from,
            to = %window.to,
            "analysis run started"
        );

        let mut reports = Vec::with_capacity(companies.len());
        for company in companies {
            let span = info_span!("company", name = company);
            reports.push(self.analyze_company(company, &window).instrument(span).await);
        }

        Ok(AnalysisRun {
            window,
            days,
            max_articles: self.config.max_articles,
            domain_count: self.config.allowed_domains.len(),
            generated_at: self.clock.now(),
            reports,
        })
    }
}
