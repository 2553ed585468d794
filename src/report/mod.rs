//! Presentation of an [`AnalysisRun`](crate::pipeline::AnalysisRun): a plain
//! text report and a flat CSV export with one row per company.

pub mod export;
pub mod render;

pub use export::{export_file_name, export_rows, write_csv};
pub use render::{banner, render_text};
