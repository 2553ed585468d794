//! Company list input: an uploaded roster CSV or a comma-separated manual
//! list. A non-empty manual list takes precedence over the roster.

use tracing::{info, warn};

use crate::error::AnalyzerError;

/// Required roster column.
pub const COMPANY_COLUMN: &str = "CompanyName";

/// Company names from a roster CSV, in row order. Blank cells are dropped.
pub fn parse_roster_csv(data: &[u8]) -> Result<Vec<String>, AnalyzerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = rdr
        .headers()
        .map_err(|e| AnalyzerError::invalid(format!("unreadable roster: {e}")))?
        .clone();
    let idx = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == COMPANY_COLUMN)
        .ok_or_else(|| {
            AnalyzerError::invalid(format!("roster must contain a '{COMPANY_COLUMN}' column"))
        })?;

    let mut out = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| AnalyzerError::invalid(format!("unreadable roster row {}: {e}", row + 2)))?;
        match rec.get(idx).map(str::trim) {
            Some(name) if !name.is_empty() => out.push(name.to_string()),
            _ => {}
        }
    }
    info!(target: "api", companies = out.len(), "roster parsed");
    Ok(out)
}

/// Split `"a, b,,c"` into trimmed, non-empty names.
pub fn parse_manual_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Final company list for a run. An empty result is invalid input.
pub fn resolve_companies(
    manual: Option<&str>,
    roster_csv: Option<&[u8]>,
) -> Result<Vec<String>, AnalyzerError> {
    let manual = manual.map(parse_manual_list).unwrap_or_default();
    if !manual.is_empty() {
        if roster_csv.is_some() {
            warn!(target: "api", "manual company list given; roster ignored");
        }
        return Ok(manual);
    }

    let roster = match roster_csv {
        Some(bytes) => parse_roster_csv(bytes)?,
        None => Vec::new(),
    };
    if roster.is_empty() {
        return Err(AnalyzerError::invalid(
            "no company names found in the manual list or the roster",
        ));
    }
    Ok(roster)
}
