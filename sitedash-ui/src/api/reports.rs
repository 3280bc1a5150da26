//! Report generation API handler
//!
//! Exports are read-only against `DashboardState` but share the single
//! work slot with ingestion: an export must not observe a half-committed
//! upload, so the two are serialized against each other.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::report::ReportRequest;
use crate::state::ReportEntry;
use crate::AppState;
use sitedash_common::events::DashEvent;

/// POST /reports/generate response
#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub report_id: Uuid,
    pub filename: String,
    pub content_type: String,
    /// Whether the plain-text fallback produced the artifact
    pub fallback: bool,
    /// Artifact body (plain text for the fallback renderer)
    pub content: String,
}

/// POST /reports/generate
pub async fn generate_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<Json<GenerateReportResponse>> {
    if request.report_type.trim().is_empty() {
        return Err(ApiError::BadRequest("report_type must not be empty".to_string()));
    }

    let _guard = state
        .work_guard
        .try_lock()
        .map_err(|_| ApiError::Conflict("Ingestion or export already running".to_string()))?;

    let report_id = Uuid::new_v4();
    let outcome = {
        let dashboard = state.dashboard.read().await;
        state.report_builder.generate(&dashboard, &request)
    };

    tracing::info!(
        report_id = %report_id,
        report_type = %request.report_type,
        project = %request.project,
        fallback = outcome.fallback,
        "Report generated"
    );

    {
        let mut dashboard = state.dashboard.write().await;
        dashboard.record_report(ReportEntry {
            report_id,
            report_type: request.report_type.clone(),
            project: request.project.clone(),
            period_start: request.start_date.clone(),
            period_end: request.end_date.clone(),
            fallback: outcome.fallback,
            filename: outcome.artifact.filename.clone(),
            generated_at: Utc::now(),
        });
    }

    state.event_bus.emit_lossy(DashEvent::ReportGenerated {
        report_id,
        report_type: request.report_type.clone(),
        project: request.project.clone(),
        fallback: outcome.fallback,
        timestamp: Utc::now(),
    });
    let (message, level) = outcome.notification;
    state
        .event_bus
        .emit_lossy(DashEvent::notification(message, level));

    Ok(Json(GenerateReportResponse {
        report_id,
        filename: outcome.artifact.filename,
        content_type: outcome.artifact.content_type,
        fallback: outcome.fallback,
        content: outcome.artifact.content,
    }))
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/reports/generate", post(generate_report))
}
