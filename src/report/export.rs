// src/report/export.rs
//! Flat export: one row per company, article columns appended in groups of
//! four. Rows are ragged; the header covers the widest company and shorter
//! rows are padded with empty cells.

use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::AnalyzerError;
use crate::pipeline::AnalysisRun;

const FIXED_COLUMNS: [&str; 3] = ["Company", "Overall Opportunity Level", "Overall Summary"];

/// `upsell_analysis_results_YYYYMMDD_HHMMSS.csv`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("upsell_analysis_results_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

fn header(max_articles: usize) -> Vec<String> {
    let mut h: Vec<String> = FIXED_COLUMNS.iter().map(|s| s.to_string()).collect();
    for i in 1..=max_articles {
        h.push(format!("Article {i} Title"));
        h.push(format!("Article {i} URL"));
        h.push(format!("Article {i} Opportunity Level"));
        h.push(format!("Article {i} Analysis"));
    }
    h
}

/// Header plus one unpadded row per company.
pub fn export_rows(run: &AnalysisRun) -> (Vec<String>, Vec<Vec<String>>) {
    let widest = run.reports.iter().map(|r| r.articles.len()).max().unwrap_or(0);
    let rows = run
        .reports
        .iter()
        .map(|r| {
            let mut row = vec![
                r.company.clone(),
                r.overall.level.label().to_string(),
                r.overall.text.clone(),
            ];
            for (i, a) in r.articles.iter().enumerate() {
                row.push(a.display_title(i + 1));
                row.push(a.article.link.clone());
                row.push(a.classification.level.label().to_string());
                row.push(a.classification.text.clone());
            }
            row
        })
        .collect();
    (header(widest), rows)
}

/// Write the run as CSV. A run without companies has nothing to export.
pub fn write_csv<W: Write>(run: &AnalysisRun, writer: W) -> Result<(), AnalyzerError> {
    if run.reports.is_empty() {
        warn!(target: "api", "export requested for an empty run");
        return Err(AnalyzerError::NothingToExport);
    }

    let (header, rows) = export_rows(run);
    let width = header.len();
    let mut w = csv::WriterBuilder::new().from_writer(writer);
    w.write_record(&header)?;
    for mut row in rows {
        row.resize(width, String::new());
        w.write_record(&row)?;
    }
    w.flush()?;
    info!(target: "api", companies = run.reports.len(), columns = width, "results exported");
    Ok(())
}
