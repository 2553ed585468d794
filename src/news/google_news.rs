// src/news/google_news.rs
//! Google News RSS search adapter (locale en-IN).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Duration;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use super::{normalize_text, Article, DateWindow, NewsSource};

pub const GOOGLE_NEWS_SEARCH_URL: &str = "https://news.google.com/rss/search";
const LOCALE_PARAMS: &str = "hl=en-IN&gl=IN&ceid=IN:en";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<ItemSource>,
}

/// `<source url="https://www.livemint.com">Mint</source>`
#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> Option<u64> {
    let ts = ts.trim();
    let ts = match ts.strip_suffix(" GMT") {
        Some(head) => format!("{head} +0000"),
        None => ts.to_string(),
    };
    OffsetDateTime::parse(&ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

pub struct GoogleNewsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl GoogleNewsProvider {
    pub fn new() -> Self {
        Self::with_base_url(GOOGLE_NEWS_SEARCH_URL)
    }

    /// Point at a different search endpoint (mirrors, mock servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; upsell-analyzer/0.1)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Search URL for `query` restricted to `window`.
    ///
    /// Google's `before:` operator is exclusive, so the day after `window.to`
    /// is sent to keep the last day in range.
    pub fn search_url(base_url: &str, query: &str, window: &DateWindow) -> String {
        let before = (window.to + Duration::days(1)).format("%Y-%m-%d");
        let q = format!("{query} after:{} before:{before}", window.from_date_str());
        format!("{base_url}?q={}&{LOCALE_PARAMS}", urlencoding::encode(&q))
    }

    /// Parse an RSS document into articles. A channel without items is empty.
    pub fn parse_feed(s: &str) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing google news rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let summary = normalize_text(it.description.as_deref().unwrap_or_default());
            let link = it.link.unwrap_or_default().trim().to_string();
            let (href, name) = match it.source {
                Some(src) => (src.url, src.name),
                None => (None, None),
            };

            let mut article = Article::new(title, link, summary, href.as_deref());
            if let Some(n) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
                article = article.with_source_name(n);
            }
            if let Some(ts) = it.pub_date.as_deref().and_then(parse_rfc2822_to_unix) {
                article = article.with_published_at(ts);
            }
            out.push(article);
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("news_parse_ms").record(ms);
        counter!("news_entries_total").increment(out.len() as u64);
        Ok(out)
    }
}

impl Default for GoogleNewsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSource for GoogleNewsProvider {
    async fn search(&self, query: &str, window: &DateWindow) -> Result<Vec<Article>> {
        let url = Self::search_url(&self.base_url, query, window);
        tracing::debug!(target: "news", %url, "google news search");
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .context("google news http get()")?
            .error_for_status()
            .context("google news non-2xx")?
            .text()
            .await
            .context("google news http .text()")?;
        Self::parse_feed(&body)
    }

    fn name(&self) -> &'static str {
        "google-news"
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
