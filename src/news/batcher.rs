// src/news/batcher.rs
//! Query batching: company × keyword vocabulary → disjunctive queries, and
//! the fetch loop that drives the news source across those queries.

use metrics::counter;
use tracing::{debug, info, warn};

use super::{cap, dedup_by_link, filter_batch, Article, DateWindow, NewsSource};
use crate::cache::ResultCache;

/// Keyword phrases combined into one search query.
pub const KEYWORDS_PER_QUERY: usize = 3;

/// Group `"{company} {keyword}"` phrases three at a time, joined with ` OR `.
/// Yields `ceil(len / 3)` queries; no keywords yields just the company name.
pub fn build_queries<S: AsRef<str>>(company: &str, keywords: &[S]) -> Vec<String> {
    let company = company.trim();
    if keywords.is_empty() {
        return vec![company.to_string()];
    }
    keywords
        .chunks(KEYWORDS_PER_QUERY)
        .map(|chunk| {
            chunk
                .iter()
                .map(|k| format!("{company} {}", k.as_ref().trim()))
                .collect::<Vec<_>>()
                .join(" OR ")
        })
        .collect()
}

/// Drives one [`NewsSource`] across query batches, memoizing each search.
pub struct Batcher<'a> {
    source: &'a dyn NewsSource,
    cache: &'a ResultCache<Vec<Article>>,
}

impl<'a> Batcher<'a> {
    pub fn new(source: &'a dyn NewsSource, cache: &'a ResultCache<Vec<Article>>) -> Self {
        Self { source, cache }
    }

    /// Search every query in order, filter each batch by domain, cap each
    /// batch and the merged result at `max_articles`, dropping repeated
    /// links. A failing batch is logged and skipped. Once the cap is reached
    /// the remaining batches cannot change the result and are not searched.
    pub async fn fetch_all(
        &self,
        company: &str,
        window: &DateWindow,
        max_articles: usize,
        queries: &[String],
        allowed_domains: &[String],
    ) -> Vec<Article> {
        let mut merged: Vec<Article> = Vec::new();

        for (i, query) in queries.iter().enumerate() {
            if merged.len() >= max_articles {
                debug!(
                    target: "news",
                    company,
                    skipped = queries.len() - i,
                    "article cap reached; remaining batches skipped"
                );
                break;
            }

            counter!("news_batches_total").increment(1);
            let batch = match self.search_cached(query, window).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(target: "news", error = ?e, company, source = self.source.name(), batch = i, "news batch failed; skipping");
                    counter!("news_batch_errors_total").increment(1);
                    continue;
                }
            };

            if batch.is_empty() {
                debug!(target: "news", company, batch = i, "no results for batch");
                continue;
            }

            let raw = batch.len();
            let mut kept = filter_batch(batch, allowed_domains);
            kept.truncate(max_articles);
            debug!(target: "news", company, batch = i, raw, kept = kept.len(), "batch filtered");

            merged.extend(kept);
            merged = dedup_by_link(merged);
        }

        let out = cap(merged, max_articles);
        counter!("news_articles_kept_total").increment(out.len() as u64);
        info!(target: "news", company, articles = out.len(), batches = queries.len(), "news fetched");
        out
    }

    async fn search_cached(&self, query: &str, window: &DateWindow) -> anyhow::Result<Vec<Article>> {
        let args = (
            self.source.name(),
            query,
            window.from_date_str(),
            window.to_date_str(),
        );
        self.cache
            .try_memoize("news.search", &args, || self.source.search(query, window))
            .await
    }
}
