//! Boundary errors: the only failures that reach the caller of a run.
//! Per-batch and per-article failures never surface here; they degrade to
//! skipped batches and sentinel classifications inside the pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Roster/manual list/day window rejected before a run starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Export requested for a run without any company rows.
    #[error("no data to export, as no analysis was performed")]
    NothingToExport,

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
