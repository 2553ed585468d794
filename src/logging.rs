//! Tracing subscriber setup shared by the service and the CLI.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_JSON: &str = "UPSELL_LOG_JSON";
/// Component targets at `info`, everything else at `warn`.
pub const DEFAULT_FILTER: &str =
    "news=info,pipeline=info,classify=info,cache=info,api=info,upsell_analyzer=info,warn";

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Install the global subscriber: `RUST_LOG` or the default filter, compact
/// output unless `UPSELL_LOG_JSON=1`. A subscriber that is already
/// installed (e.g. by the hosting runtime) is left in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    let json = std::env::var(ENV_LOG_JSON).is_ok_and(|v| v == "1");

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
