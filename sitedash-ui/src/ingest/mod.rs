//! Ingestion pipeline
//!
//! End-to-end commit of one uploaded workbook, as a fixed sequence:
//! parse → classify → commit Projects (registry rebuild) → resolve and
//! commit dependent sheets → purge unresolved rows → summarize.
//!
//! Each step is a hard sequence point. A workbook that cannot be parsed
//! aborts before any mutation; there is no per-sheet rollback — once the
//! Projects overwrite has happened it stays, whatever later sheets do.
//! Callers must serialize ingestions (see `AppState::work_guard`): the
//! commit sequence is not atomic across collections and a second pipeline
//! interleaved with it could read a half-updated registry.

pub mod workbook;

use crate::classifier::{classify_sheets, SheetRole};
use crate::registry::IdentifierRegistry;
use crate::resolver::{RowResolver, UNRESOLVED_CODE};
use crate::state::{DashboardState, UploadEntry};
use chrono::Utc;
use serde::Serialize;
use sitedash_common::events::{DashEvent, EventBus, NotificationLevel};
use sitedash_common::rows::ProjectRecord;
use sitedash_common::Result;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one successful ingestion
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub upload_id: Uuid,
    pub filename: String,
    pub size_bytes: usize,
    /// Rows committed across all sheets, counted before the purge
    pub total_rows: usize,
    /// Dependent rows dropped because no project could be resolved;
    /// `total_rows - purged_rows` is what the dashboard actually shows
    pub purged_rows: usize,
    /// Labels of committed sheet roles, Projects first
    pub processed_sheets: Vec<String>,
}

/// Orchestrates workbook ingestion against the shared state
pub struct IngestionPipeline {
    event_bus: EventBus,
}

impl IngestionPipeline {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Ingest one workbook
    ///
    /// On a parse failure nothing is mutated and the error is returned for
    /// the caller to surface. On success every classified sheet has been
    /// committed, the registry reflects the latest Projects sheet, and no
    /// dependent row carries an unresolved code.
    pub fn ingest(
        &self,
        dashboard: &mut DashboardState,
        registry: &mut IdentifierRegistry,
        filename: &str,
        bytes: &[u8],
    ) -> Result<IngestSummary> {
        let upload_id = Uuid::new_v4();

        self.event_bus.emit_lossy(DashEvent::IngestStarted {
            upload_id,
            filename: filename.to_string(),
            timestamp: Utc::now(),
        });

        // Step 1: parse. Abort here on failure, before any mutation.
        let sheets = match workbook::parse_workbook(bytes) {
            Ok(sheets) => sheets,
            Err(e) => {
                warn!(upload_id = %upload_id, filename, error = %e, "Workbook rejected");
                self.event_bus.emit_lossy(DashEvent::IngestFailed {
                    upload_id,
                    filename: filename.to_string(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                self.event_bus.emit_lossy(DashEvent::notification(
                    format!("Upload {filename} failed: {e}"),
                    NotificationLevel::Error,
                ));
                return Err(e);
            }
        };

        // Step 2: classify surviving sheets.
        let sheet_names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
        let roles = classify_sheets(&sheet_names);

        let mut total_rows = 0;
        let mut processed_sheets = Vec::new();

        // Step 3: Projects commit first, then a full registry rebuild, so
        // dependent resolution sees the new mapping. Without a Projects
        // sheet both stay untouched for this upload.
        if let Some(&index) = roles.get(&SheetRole::Projects) {
            let projects: Vec<ProjectRecord> = sheets[index]
                .rows
                .iter()
                .map(|row| {
                    let mut record = ProjectRecord::from_row(row);
                    if record.code.is_empty() {
                        // Backfill from the registry as it stood before
                        // this upload (seed plus previous projects).
                        if let Some(code) = registry.code_for(&record.name) {
                            record.code = code.to_string();
                        }
                    }
                    record
                })
                .collect();

            total_rows += projects.len();
            dashboard.replace_projects(projects);
            registry.rebuild(&dashboard.projects);
            processed_sheets.push(SheetRole::Projects.label().to_string());

            info!(
                upload_id = %upload_id,
                project_count = dashboard.projects.len(),
                registry_size = registry.len(),
                "Projects committed and registry rebuilt"
            );
        }

        // Step 4: dependent sheets, each row stamped with a resolved code.
        for role in SheetRole::dependents() {
            let Some(&index) = roles.get(&role) else {
                continue;
            };

            let rows: Vec<_> = {
                let resolver = RowResolver::new(registry, &dashboard.projects);
                sheets[index]
                    .rows
                    .iter()
                    .map(|row| {
                        let mut row = row.clone();
                        let code = resolver.resolve(&row);
                        row.set_project_code(&code);
                        row
                    })
                    .collect()
            };

            total_rows += rows.len();
            dashboard.replace_dependent(role, rows);
            processed_sheets.push(role.label().to_string());
        }

        // Step 5: purge orphans.
        let purged_rows =
            dashboard.purge_dependents(|code| code.is_empty() || code == UNRESOLVED_CODE);
        if purged_rows > 0 {
            warn!(upload_id = %upload_id, purged_rows, "Dropped rows with unresolvable projects");
        }

        // Step 6: summary plus audit trail.
        let summary = IngestSummary {
            upload_id,
            filename: filename.to_string(),
            size_bytes: bytes.len(),
            total_rows,
            purged_rows,
            processed_sheets: processed_sheets.clone(),
        };

        dashboard.record_upload(UploadEntry {
            upload_id,
            filename: filename.to_string(),
            size_bytes: bytes.len(),
            row_count: total_rows,
            processed_sheets: processed_sheets.clone(),
            uploaded_at: Utc::now(),
        });

        info!(
            upload_id = %upload_id,
            filename,
            total_rows,
            purged_rows,
            sheets = ?processed_sheets,
            "Ingestion complete"
        );

        self.event_bus.emit_lossy(DashEvent::IngestCompleted {
            upload_id,
            filename: filename.to_string(),
            total_rows,
            purged_rows,
            processed_sheets,
            timestamp: Utc::now(),
        });
        self.event_bus.emit_lossy(DashEvent::notification(
            format!(
                "Workbook {filename} ingested: {} rows across {} sheets",
                total_rows,
                summary.processed_sheets.len()
            ),
            NotificationLevel::Success,
        ));

        Ok(summary)
    }
}
