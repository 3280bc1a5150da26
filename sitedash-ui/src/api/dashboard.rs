//! Dashboard read API handlers
//!
//! All read-only views over `DashboardState`: KPI overview, per-role
//! collections, project filter options and the audit trails.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::classifier::SheetRole;
use crate::error::{ApiError, ApiResult};
use crate::registry::ALL_PROJECTS;
use crate::report::{aggregate, ReportFigures};
use crate::state::{ReportEntry, UploadEntry};
use crate::AppState;

/// GET /overview response
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    #[serde(flatten)]
    pub figures: ReportFigures,
    /// Row counts per dependent collection, after the purge
    pub collection_counts: Vec<CollectionCount>,
}

#[derive(Debug, Serialize)]
pub struct CollectionCount {
    pub role: String,
    pub rows: usize,
}

/// GET /overview
///
/// KPI aggregates over the full dashboard, unfiltered.
pub async fn overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    let dashboard = state.dashboard.read().await;
    let figures = aggregate(&dashboard, ALL_PROJECTS);

    let collection_counts = SheetRole::dependents()
        .map(|role| CollectionCount {
            role: role.label().to_string(),
            rows: dashboard.dependent(role).map_or(0, Vec::len),
        })
        .collect();

    Json(OverviewResponse {
        figures,
        collection_counts,
    })
}

/// GET /collections/{role}
///
/// Rows of one collection; `projects` returns the typed project records,
/// every other role its post-purge dependent rows.
pub async fn collection(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let role = SheetRole::from_label(&role)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown collection: {role}")))?;

    let dashboard = state.dashboard.read().await;
    let value = match role {
        SheetRole::Projects => serde_json::to_value(&dashboard.projects),
        dependent => serde_json::to_value(dashboard.dependent(dependent)),
    }
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(value))
}

/// GET /projects/filters
///
/// Project drop-down options: "all" followed by every display name.
pub async fn project_filters(State(state): State<AppState>) -> Json<Vec<String>> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.project_filter_options())
}

/// GET /uploads
pub async fn upload_history(State(state): State<AppState>) -> Json<Vec<UploadEntry>> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.upload_history.clone())
}

/// GET /reports
pub async fn report_log(State(state): State<AppState>) -> Json<Vec<ReportEntry>> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.generated_reports.clone())
}

/// Build dashboard read routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/collections/:role", get(collection))
        .route("/projects/filters", get(project_filters))
        .route("/uploads", get(upload_history))
        .route("/reports", get(report_log))
}
