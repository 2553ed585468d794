//! Upsell analyzer service: binary entrypoint.
//! Boots the Axum HTTP server with the Google News source and the configured
//! text-generation provider.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing::info;

use upsell_analyzer::api::{create_router, AppState};
use upsell_analyzer::classify::{build_generator, TextGenerator};
use upsell_analyzer::config::{ai::AiConfig, analyzer::AnalyzerConfig};
use upsell_analyzer::logging::init_tracing;
use upsell_analyzer::metrics::Metrics;
use upsell_analyzer::news::google_news::GoogleNewsProvider;
use upsell_analyzer::{Analyzer, SystemClock};

fn build_app() -> anyhow::Result<axum::Router> {
    let config = AnalyzerConfig::load_default().context("loading analyzer config")?;
    let ai = AiConfig::load_default().context("loading ai config")?;
    let generator = build_generator(&ai)?;
    info!(
        provider = generator.name(),
        days_back = config.days_back,
        max_articles = config.max_articles,
        domains = config.allowed_domains.len(),
        keywords = config.keywords.len(),
        "upsell analyzer configured"
    );

    let analyzer = Analyzer::with_clock(
        Arc::new(GoogleNewsProvider::new()),
        generator,
        config,
        Arc::new(SystemClock),
        Duration::from_secs(ai.timeout_secs),
    );
    let metrics = Metrics::init()?;
    Ok(create_router(AppState::new(analyzer), &metrics))
}

#[shuttle_runtime::main]
async fn service() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let router = build_app()?;
    Ok(router.into())
}
