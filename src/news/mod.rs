// src/news/mod.rs
//! News retrieval: the search adapter seam, article records, and the
//! batch → filter → limit stages that turn a company into an article set.

pub mod batcher;
pub mod filter;
pub mod google_news;
pub mod limit;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub use batcher::{build_queries, Batcher};
pub use filter::filter_batch;
pub use limit::{cap, dedup_by_link};

/// One search hit. Immutable once fetched; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Normalized summary text; may be empty.
    pub summary: String,
    /// Publisher host without a leading `www.`.
    pub domain: String,
    /// Publisher display name, when the feed carries one.
    pub source_name: Option<String>,
    /// Unix seconds, when the feed carries a parseable date.
    pub published_at: Option<u64>,
}

impl Article {
    /// Build an article, deriving `domain` from the publisher href and
    /// falling back to the article link when there is none.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        summary: impl Into<String>,
        source_href: Option<&str>,
    ) -> Self {
        let link = link.into();
        let domain = source_href
            .map(domain_of)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| domain_of(&link));
        Self {
            title: title.into(),
            link,
            summary: summary.into(),
            domain,
            source_name: None,
            published_at: None,
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_published_at(mut self, ts: u64) -> Self {
        self.published_at = Some(ts);
        self
    }

    /// Text submitted for classification: summary, else title, else empty.
    pub fn text(&self) -> &str {
        if !self.summary.trim().is_empty() {
            self.summary.as_str()
        } else {
            self.title.trim()
        }
    }
}

/// Inclusive calendar-date range of a search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// `[to - days, to]`.
    pub fn ending_at(to: NaiveDate, days: u32) -> Self {
        Self {
            from: to - Duration::days(i64::from(days)),
            to,
        }
    }

    pub fn from_date_str(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_date_str(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

/// External news-search capability.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Articles matching `query` in `window`. No hits is `Ok(vec![])`.
    async fn search(&self, query: &str, window: &DateWindow) -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
}

/// Host of `url`, lowercased, without a leading `www.`; empty if unparseable.
pub fn domain_of(url: &str) -> String {
    let host = url::Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .unwrap_or_default();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. decoded &nbsp;)
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}]+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_strips_www_and_port() {
        assert_eq!(domain_of("https://www.livemint.com/companies/x"), "livemint.com");
        assert_eq!(
            domain_of("https://economictimes.indiatimes.com:443/a"),
            "economictimes.indiatimes.com"
        );
        assert_eq!(domain_of("HTTPS://WWW.Reuters.com"), "reuters.com");
        assert_eq!(domain_of(""), "");
        assert_eq!(domain_of("not a url"), "");
    }

    #[test]
    fn article_domain_prefers_source_href() {
        let a = Article::new(
            "t",
            "https://news.google.com/rss/articles/abc",
            "",
            Some("https://www.business-standard.com"),
        );
        assert_eq!(a.domain, "business-standard.com");

        let b = Article::new("t", "https://www.zeebiz.com/x", "", None);
        assert_eq!(b.domain, "zeebiz.com");

        let c = Article::new("t", "https://www.zeebiz.com/x", "", Some(""));
        assert_eq!(c.domain, "zeebiz.com");
    }

    #[test]
    fn text_falls_back_to_title() {
        let a = Article::new("Title only", "https://x.in", "  ", None);
        assert_eq!(a.text(), "Title only");
        let b = Article::new("Title", "https://x.in", "Summary", None);
        assert_eq!(b.text(), "Summary");
        let c = Article::new("", "https://x.in", "", None);
        assert_eq!(c.text(), "");
    }

    #[test]
    fn normalize_text_strips_markup() {
        let s = r##"<a href="https://x">Infosys plans &amp; hiring</a>&nbsp;&nbsp;<font color="#6f6f6f">Mint</font>"##;
        assert_eq!(normalize_text(s), "Infosys plans & hiring Mint");
    }

    #[test]
    fn window_is_inclusive_day_range() {
        let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let w = DateWindow::ending_at(to, 90);
        assert_eq!(w.from_date_str(), "2024-12-31");
        assert_eq!(w.to_date_str(), "2025-03-31");
    }
}
