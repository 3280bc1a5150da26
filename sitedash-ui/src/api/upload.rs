//! Workbook upload API handler
//!
//! POST /upload accepts a multipart workbook and runs the ingestion
//! pipeline. Ingestions are serialized: a second upload while one is in
//! flight gets 409 Conflict rather than interleaving with a half-updated
//! registry.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::ingest::IngestionPipeline;
use crate::AppState;

/// POST /upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub upload_id: Uuid,
    pub filename: String,
    pub size_bytes: usize,
    /// Rows committed before the purge
    pub total_rows: usize,
    /// Orphan rows dropped by the purge
    pub purged_rows: usize,
    pub processed_sheets: Vec<String>,
}

/// POST /upload
///
/// Accepts the first file field of a multipart body as the workbook blob.
pub async fn upload_workbook(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    // Pull the workbook out of the multipart body first; a broken body
    // should not claim the ingestion slot.
    let mut filename = String::from("workbook");
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.file_name().is_none() && bytes.is_some() {
            continue;
        }
        if let Some(name) = field.file_name() {
            filename = name.to_string();
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
        bytes = Some(data.to_vec());
        break;
    }

    let bytes = bytes.ok_or_else(|| ApiError::BadRequest("No file in upload".to_string()))?;

    // Single-slot serialization: ingestion spans await points and the
    // commit sequence is not atomic across collections.
    let _guard = state
        .work_guard
        .try_lock()
        .map_err(|_| ApiError::Conflict("Ingestion or export already running".to_string()))?;

    tracing::info!(filename = %filename, size_bytes = bytes.len(), "Upload accepted");

    let pipeline = IngestionPipeline::new(state.event_bus.clone());
    let mut dashboard = state.dashboard.write().await;
    let mut registry = state.registry.write().await;

    let summary = pipeline.ingest(&mut dashboard, &mut registry, &filename, &bytes)?;

    Ok(Json(UploadResponse {
        upload_id: summary.upload_id,
        filename: summary.filename,
        size_bytes: summary.size_bytes,
        total_rows: summary.total_rows,
        purged_rows: summary.purged_rows,
        processed_sheets: summary.processed_sheets,
    }))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_workbook))
}
