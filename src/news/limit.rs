// src/news/limit.rs
//! Per-company article limiter: drop repeated links, then cap.

use std::collections::HashSet;

use super::Article;

/// First `max` articles, order preserved.
pub fn cap(mut articles: Vec<Article>, max: usize) -> Vec<Article> {
    articles.truncate(max);
    articles
}

/// Drop articles whose link was already seen earlier in the sequence.
/// Overlapping OR-queries commonly return the same story more than once.
pub fn dedup_by_link(articles: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::with_capacity(articles.len());
    articles
        .into_iter()
        .filter(|a| a.link.is_empty() || seen.insert(a.link.clone()))
        .collect()
}
