use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Register help text for every series this crate emits. Idempotent.
pub fn describe_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_batches_total", "Query batches sent to the news source.");
        describe_counter!(
            "news_batch_errors_total",
            "Query batches skipped because the news source failed."
        );
        describe_counter!(
            "news_articles_kept_total",
            "Articles kept per company after filter, dedup and cap."
        );
        describe_counter!(
            "news_fallback_total",
            "Batches where no allow-listed article matched and the top result was kept."
        );
        describe_counter!("news_entries_total", "Feed items parsed from news responses.");
        describe_histogram!("news_parse_ms", "Feed parse time in milliseconds.");
        describe_counter!("classify_calls_total", "Text-generation calls made (cache misses).");
        describe_counter!(
            "classify_failures_total",
            "Text-generation calls replaced by the failure sentinel."
        );
        describe_counter!(
            "classify_skipped_total",
            "Classifications answered without a remote call."
        );
        describe_counter!("cache_hits_total", "Result cache hits.");
        describe_counter!("cache_misses_total", "Result cache misses.");
        describe_histogram!("pipeline_company_ms", "Wall time to analyse one company.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        describe_metrics();
        Ok(Self { handle })
    }

    /// Recorder that is not installed globally; renders an empty exposition.
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
        }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
