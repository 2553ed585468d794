// tests/pipeline_e2e.rs
//
// End-to-end runs over scripted news and text-generation collaborators.

mod common;

use std::sync::Arc;

use common::{
    analyzer, article, clock, config, FailingSource, FlakySource, ScriptedGenerator, StaticSource,
};
use upsell_analyzer::classify::{Origin, FAILURE_RESULT, NO_ARTICLES_RESULT, NO_TEXT_RESULT};
use upsell_analyzer::news::Article;
use upsell_analyzer::{AnalyzerConfig, AnalyzerError, OpportunityLevel};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn company_without_news_gets_no_articles_summary() {
    let source = StaticSource::new(vec![]);
    let gen = ScriptedGenerator::new("High Opportunity");
    let a = analyzer(source.clone(), gen.clone(), config(), clock());

    let run = a.run(&names(&["Acme"]), 90).await.unwrap();
    let report = &run.reports[0];
    assert!(report.articles.is_empty());
    assert_eq!(report.overall.text, NO_ARTICLES_RESULT);
    assert_eq!(report.overall.origin, Origin::NoArticles);
    assert_eq!(gen.calls(), 0);
    assert_eq!(source.searches(), 1);
}

#[tokio::test]
async fn article_without_text_is_not_sent() {
    let blank = Article::new("", "https://news.example/blank", "", None);
    let gen = ScriptedGenerator::new("Overall No Upsell Opportunity Indicated.");
    let a = analyzer(StaticSource::new(vec![blank]), gen.clone(), config(), clock());

    let run = a.run(&names(&["Acme"]), 30).await.unwrap();
    let report = &run.reports[0];
    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].classification.text, NO_TEXT_RESULT);
    assert_eq!(report.articles[0].classification.origin, Origin::NoText);

    // Only the aggregate reached the generator.
    assert_eq!(gen.calls(), 1);
    assert!(gen.prompts()[0].contains(&format!("Article 1 Analysis:\n{NO_TEXT_RESULT}")));
}

#[tokio::test]
async fn one_failing_article_does_not_spoil_the_others() {
    let articles = vec![
        article(1, "Acme raises Series C"),
        article(2, "Acme BOOM layoffs rumour"),
        article(3, "Acme opens Pune campus"),
    ];
    let gen = ScriptedGenerator::failing_on("Medium Opportunity\nReason: growth", "BOOM");
    let a = analyzer(StaticSource::new(articles), gen.clone(), config(), clock());

    let run = a.run(&names(&["Acme"]), 90).await.unwrap();
    let report = &run.reports[0];
    assert_eq!(report.articles.len(), 3);

    let c: Vec<_> = report.articles.iter().map(|a| &a.classification).collect();
    assert_eq!(c[0].level, OpportunityLevel::Medium);
    assert_eq!(c[1].text, FAILURE_RESULT);
    assert_eq!(c[1].origin, Origin::Failed);
    assert_eq!(c[2].level, OpportunityLevel::Medium);

    assert_eq!(gen.calls(), 4);
    let aggregate = gen.prompts().pop().unwrap();
    assert!(aggregate.contains("Article 1 Analysis:"));
    assert!(aggregate.contains(&format!("Article 2 Analysis:\n{FAILURE_RESULT}")));
    assert!(aggregate.contains("Article 3 Analysis:"));
    assert!(!aggregate.contains("Article 4 Analysis:"));
    assert_eq!(report.overall.level, OpportunityLevel::Medium);
}

#[tokio::test]
async fn repeated_run_within_ttl_is_served_from_cache() {
    let source = StaticSource::new(vec![article(1, "Acme hires 2,000 engineers")]);
    let gen = ScriptedGenerator::new("High Opportunity");
    let clk = clock();
    let a = analyzer(source.clone(), gen.clone(), config(), clk.clone());
    let companies = names(&["Acme"]);

    let first = a.run(&companies, 90).await.unwrap();
    assert_eq!((source.searches(), gen.calls()), (1, 2));

    clk.advance(chrono::Duration::minutes(30));
    let second = a.run(&companies, 90).await.unwrap();
    assert_eq!((source.searches(), gen.calls()), (1, 2));
    assert_eq!(first.reports, second.reports);

    clk.advance(chrono::Duration::minutes(31));
    a.run(&companies, 90).await.unwrap();
    assert_eq!((source.searches(), gen.calls()), (2, 4));
}

#[tokio::test]
async fn failed_classifications_are_retried_next_run() {
    let source = StaticSource::new(vec![article(1, "Acme BOOM")]);
    let gen = ScriptedGenerator::failing_on("High Opportunity", "BOOM");
    let a = analyzer(source, gen.clone(), config(), clock());
    let companies = names(&["Acme"]);

    a.run(&companies, 90).await.unwrap();
    let after_first = gen.calls();
    a.run(&companies, 90).await.unwrap();
    // Failed article call is repeated; the aggregate is cached.
    assert_eq!(gen.calls(), after_first + 1);
}

#[tokio::test]
async fn failing_news_source_degrades_to_empty_report() {
    let gen = ScriptedGenerator::new("High Opportunity");
    let a = analyzer(Arc::new(FailingSource), gen.clone(), config(), clock());

    let run = a.run(&names(&["Acme", "Globex"]), 90).await.unwrap();
    assert_eq!(run.reports.len(), 2);
    for r in &run.reports {
        assert!(r.articles.is_empty());
        assert_eq!(r.overall.text, NO_ARTICLES_RESULT);
    }
    assert_eq!(gen.calls(), 0);
}

#[tokio::test]
async fn failed_batch_is_skipped_and_later_batches_kept() {
    let cfg = AnalyzerConfig {
        keywords: names(&["a", "b", "c", "d"]),
        ..config()
    };
    let source = FlakySource::new(vec![article(7, "Acme expands Chennai office")]);
    let gen = ScriptedGenerator::new("Medium Opportunity");
    let a = analyzer(source.clone(), gen.clone(), cfg, clock());

    let run = a.run(&names(&["Acme"]), 90).await.unwrap();
    assert_eq!(source.searches(), 2);
    let report = &run.reports[0];
    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].article.link, "https://news.example/7");
    assert_eq!(report.overall.level, OpportunityLevel::Medium);
    assert_eq!(gen.calls(), 2);
}

#[tokio::test]
async fn unlisted_publishers_fall_back_to_top_result() {
    let cfg = AnalyzerConfig {
        allowed_domains: vec!["reuters.com".into()],
        ..config()
    };
    let source = StaticSource::new(vec![article(1, "first"), article(2, "second")]);
    let a = analyzer(source, ScriptedGenerator::new("Low Opportunity"), cfg, clock());

    let run = a.run(&names(&["Acme"]), 90).await.unwrap();
    let links: Vec<_> = run.reports[0]
        .articles
        .iter()
        .map(|a| a.article.link.as_str())
        .collect();
    assert_eq!(links, vec!["https://news.example/1"]);
}

#[tokio::test]
async fn batches_stop_once_cap_is_reached() {
    let cfg = AnalyzerConfig {
        keywords: names(&["a", "b", "c", "d", "e", "f", "g"]),
        max_articles: 2,
        ..config()
    };
    let source = StaticSource::new(vec![article(1, "x"), article(2, "y"), article(3, "z")]);
    let a = analyzer(source.clone(), ScriptedGenerator::new("Low Opportunity"), cfg, clock());

    let run = a.run(&names(&["Acme"]), 90).await.unwrap();
    assert_eq!(run.reports[0].articles.len(), 2);
    assert_eq!(source.searches(), 1);
    assert_eq!(
        source.queries.lock().unwrap()[0],
        "Acme a OR Acme b OR Acme c"
    );
}

#[tokio::test]
async fn duplicate_links_across_batches_are_dropped() {
    let cfg = AnalyzerConfig {
        keywords: names(&["a", "b", "c", "d"]),
        ..config()
    };
    let source = StaticSource::new(vec![article(1, "x"), article(2, "y")]);
    let a = analyzer(source.clone(), ScriptedGenerator::new("Low Opportunity"), cfg, clock());

    let run = a.run(&names(&["Acme"]), 90).await.unwrap();
    assert_eq!(source.searches(), 2);
    assert_eq!(run.reports[0].articles.len(), 2);
}

#[tokio::test]
async fn invalid_day_window_is_rejected_before_any_search() {
    let source = StaticSource::new(vec![article(1, "x")]);
    let a = analyzer(source.clone(), ScriptedGenerator::new("x"), config(), clock());
    let err = a.run(&names(&["Acme"]), 0).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    assert_eq!(source.searches(), 0);
}
