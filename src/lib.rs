// src/lib.rs
// Public library surface for the service binary, the CLI and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod roster;

// News retrieval: adapter, batching, domain filter, limiter
pub mod news;

// Opportunity scoring: prompts, text generation providers, classifier
pub mod classify;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::cache::{Clock, ManualClock, ResultCache, SystemClock};
pub use crate::classify::{extract_level, Classification, OpportunityLevel};
pub use crate::config::{ai::AiConfig, analyzer::AnalyzerConfig};
pub use crate::error::AnalyzerError;
pub use crate::pipeline::{AnalysisRun, Analyzer, ArticleAnalysis, CompanyReport};
