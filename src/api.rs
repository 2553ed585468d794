use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::error::AnalyzerError;
use crate::metrics::Metrics;
use crate::pipeline::{AnalysisRun, Analyzer};
use crate::report::{export_file_name, render_text, write_csv};
use crate::roster::resolve_companies;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

pub fn create_router(state: AppState, metrics: &Metrics) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/export", post(export))
        .route("/render", post(render))
        .with_state(state)
        .merge(metrics.router())
        .layer(CorsLayer::very_permissive())
}

/// Shared body of `/analyze`, `/export` and `/render`.
///
/// `companies` wins when it has any non-blank entry, then `manual`
/// (comma-separated), then `roster_csv`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeReq {
    #[serde(default)]
    pub companies: Option<Vec<String>>,
    #[serde(default)]
    pub manual: Option<String>,
    #[serde(default)]
    pub roster_csv: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
}

impl AnalyzeReq {
    fn company_list(&self) -> Result<Vec<String>, AnalyzerError> {
        let explicit: Vec<String> = self
            .companies
            .iter()
            .flatten()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if !explicit.is_empty() {
            return Ok(explicit);
        }
        resolve_companies(
            self.manual.as_deref(),
            self.roster_csv.as_deref().map(str::as_bytes),
        )
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError(AnalyzerError);

impl From<AnalyzerError> for ApiError {
    fn from(e: AnalyzerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AnalyzerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AnalyzerError::NothingToExport => StatusCode::UNPROCESSABLE_ENTITY,
            AnalyzerError::Export(_) | AnalyzerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(target: "api", %status, error = %self.0, "request rejected");
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

async fn run_request(state: &AppState, req: &AnalyzeReq) -> Result<AnalysisRun, ApiError> {
    let companies = req.company_list()?;
    let days = req.days.unwrap_or(state.analyzer.config().days_back);
    info!(target: "api", companies = companies.len(), days, "analysis requested");
    Ok(state.analyzer.run(&companies, days).await?)
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeReq>,
) -> Result<Json<AnalysisRun>, ApiError> {
    Ok(Json(run_request(&state, &req).await?))
}

async fn render(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeReq>,
) -> Result<Response, ApiError> {
    let run = run_request(&state, &req).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_text(&run),
    )
        .into_response())
}

async fn export(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeReq>,
) -> Result<Response, ApiError> {
    let run = run_request(&state, &req).await?;
    let mut buf = Vec::new();
    write_csv(&run, &mut buf)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(run.generated_at)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buf,
    )
        .into_response())
}
