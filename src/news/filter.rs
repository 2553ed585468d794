// src/news/filter.rs
//! Publisher allow-list filter applied to one search batch.

use metrics::counter;

use super::Article;

/// True if any allow-listed domain is a substring of the article's domain.
/// Substring (not equality) so subdomains like `m.livemint.com` match.
pub fn is_allowed(article: &Article, allowed_domains: &[String]) -> bool {
    allowed_domains
        .iter()
        .any(|d| !d.is_empty() && article.domain.contains(d.as_str()))
}

/// Keep allow-listed articles of one batch, in order.
///
/// If the batch is non-empty but nothing passes, the batch's first article is
/// kept on its own so thinly covered companies still surface something. An
/// empty allow-list disables filtering.
pub fn filter_batch(batch: Vec<Article>, allowed_domains: &[String]) -> Vec<Article> {
    if allowed_domains.is_empty() {
        return batch;
    }

    let fallback = batch.first().cloned();
    let mut kept: Vec<Article> = batch
        .into_iter()
        .filter(|a| is_allowed(a, allowed_domains))
        .collect();

    if kept.is_empty() {
        if let Some(first) = fallback {
            counter!("news_fallback_total").increment(1);
            tracing::debug!(target: "news", domain = %first.domain, "no allow-listed article in batch; keeping top result");
            kept.push(first);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(n: u32, href: &str) -> Article {
        Article::new(
            format!("t{n}"),
            format!("https://news.google.com/rss/articles/{n}"),
            format!("s{n}"),
            Some(href),
        )
    }

    fn allow(ds: &[&str]) -> Vec<String> {
        ds.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_and_subdomain_matches_are_kept() {
        let batch = vec![
            art(1, "https://www.livemint.com"),
            art(2, "https://randomblog.example"),
            art(3, "https://m.economictimes.indiatimes.com"),
        ];
        let out = filter_batch(
            batch,
            &allow(&["livemint.com", "economictimes.indiatimes.com"]),
        );
        let titles: Vec<_> = out.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["t1", "t3"]);
    }

    #[test]
    fn no_match_keeps_exactly_first_article() {
        let batch = vec![
            art(1, "https://blog-a.example"),
            art(2, "https://blog-b.example"),
        ];
        let out = filter_batch(batch, &allow(&["reuters.com"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "t1");
    }

    #[test]
    fn empty_batch_stays_empty() {
        assert!(filter_batch(Vec::new(), &allow(&["reuters.com"])).is_empty());
    }

    #[test]
    fn empty_allow_list_passes_everything() {
        let batch = vec![art(1, "https://a.example"), art(2, "https://b.example")];
        assert_eq!(filter_batch(batch.clone(), &[]), batch);
    }

    #[test]
    fn article_without_domain_never_matches() {
        let a = Article::new("t", "", "", None);
        assert!(!is_allowed(&a, &allow(&["reuters.com"])));
    }
}
