// src/report/render.rs
use std::fmt::Write as _;

use crate::classify::OpportunityLevel;
use crate::pipeline::{AnalysisRun, CompanyReport};

pub const NO_ARTICLES_NOTE: &str = "No individual articles found for detailed analysis.";

const RULE: &str = "------------------------------------------------------------";

/// Severity tag shown next to a verdict.
pub fn banner(level: OpportunityLevel) -> &'static str {
    match level {
        OpportunityLevel::High => "[HIGH]",
        OpportunityLevel::Medium => "[MEDIUM]",
        OpportunityLevel::Low => "[LOW]",
        OpportunityLevel::NoOpportunity | OpportunityLevel::Unknown => "[NONE]",
    }
}

/// Human-readable report for a whole run.
pub fn render_text(run: &AnalysisRun) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Upsell opportunity analysis: {} to {} ({} days), up to {} articles per company from {} trusted domains",
        run.window.from_date_str(),
        run.window.to_date_str(),
        run.days,
        run.max_articles,
        run.domain_count,
    );
    let _ = writeln!(out, "{RULE}");
    for report in &run.reports {
        render_company(&mut out, report);
        let _ = writeln!(out, "{RULE}");
    }
    out
}

fn render_company(out: &mut String, report: &CompanyReport) {
    let _ = writeln!(out, "## {}", report.company);
    let _ = writeln!(out, "### Summary for {}", report.company);
    let _ = writeln!(out, "{} {}", banner(report.overall.level), report.overall.text.trim());
    let _ = writeln!(out);
    let _ = writeln!(out, "### Individual Article Analyses");

    if report.articles.is_empty() {
        let _ = writeln!(out, "{NO_ARTICLES_NOTE}");
        return;
    }
    for (i, a) in report.articles.iter().enumerate() {
        let _ = writeln!(out, "#### {}", a.display_title(i + 1));
        let _ = writeln!(out, "URL: {}", a.article.link);
        let _ = writeln!(
            out,
            "{} Analysis: {}",
            banner(a.classification.level),
            a.classification.text.trim()
        );
        let _ = writeln!(out);
    }
}
