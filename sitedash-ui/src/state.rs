//! In-memory dashboard state
//!
//! `DashboardState` is the single owner of every entity collection. It is
//! seeded once at startup and mutated only by the ingestion pipeline;
//! registry and resolver get read access at resolution time, never private
//! copies. Collections are replaced wholesale, not patched, and nothing
//! survives the process.

use crate::classifier::SheetRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitedash_common::rows::{ProjectRecord, SheetRow};
use uuid::Uuid;

/// Audit entry for one accepted upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEntry {
    pub upload_id: Uuid,
    pub filename: String,
    pub size_bytes: usize,
    /// Rows committed across all sheets, counted before the purge
    pub row_count: usize,
    pub processed_sheets: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Audit entry for one generated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub report_id: Uuid,
    pub report_type: String,
    /// Project filter ("all" or one project name)
    pub project: String,
    pub period_start: String,
    pub period_end: String,
    /// Whether the plain-text fallback produced the artifact
    pub fallback: bool,
    pub filename: String,
    pub generated_at: DateTime<Utc>,
}

/// The authoritative in-memory store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub projects: Vec<ProjectRecord>,
    pub s_curve: Vec<SheetRow>,
    pub safety: Vec<SheetRow>,
    pub issues: Vec<SheetRow>,
    pub plans: Vec<SheetRow>,
    pub documents: Vec<SheetRow>,
    pub permits: Vec<SheetRow>,
    /// Pure audit trail, not reconciled data
    pub upload_history: Vec<UploadEntry>,
    /// Pure audit trail, not reconciled data
    pub generated_reports: Vec<ReportEntry>,
}

impl DashboardState {
    /// Initial state loaded at startup: the seven known projects with
    /// representative figures, all dependent collections empty.
    pub fn seeded() -> Self {
        let seed = [
            ("PROJ001", "Petani Substation", 72.0, 65.0, 92.0),
            ("PROJ002", "Menggala Substation", 58.0, 51.0, 88.0),
            ("PROJ003", "Nella Substation", 81.0, 77.0, 95.0),
            ("PROJ004", "Bangko Substation", 34.0, 30.0, 90.0),
            ("PROJ005", "Balam SS", 46.0, 42.0, 86.0),
            ("PROJ006", "Sintong SS", 63.0, 59.0, 93.0),
            ("PROJ007", "OKB Substation", 27.0, 22.0, 89.0),
        ];

        Self {
            projects: seed
                .into_iter()
                .map(|(code, name, progress, budget, safety)| ProjectRecord {
                    code: code.to_string(),
                    name: name.to_string(),
                    progress_percent: progress,
                    budget_used_percent: budget,
                    safety_score: safety,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Read a dependent collection by role; `None` for Projects
    pub fn dependent(&self, role: SheetRole) -> Option<&Vec<SheetRow>> {
        match role {
            SheetRole::Projects => None,
            SheetRole::SCurve => Some(&self.s_curve),
            SheetRole::Safety => Some(&self.safety),
            SheetRole::Issues => Some(&self.issues),
            SheetRole::Plans => Some(&self.plans),
            SheetRole::Documents => Some(&self.documents),
            SheetRole::Permits => Some(&self.permits),
        }
    }

    fn dependent_mut(&mut self, role: SheetRole) -> Option<&mut Vec<SheetRow>> {
        match role {
            SheetRole::Projects => None,
            SheetRole::SCurve => Some(&mut self.s_curve),
            SheetRole::Safety => Some(&mut self.safety),
            SheetRole::Issues => Some(&mut self.issues),
            SheetRole::Plans => Some(&mut self.plans),
            SheetRole::Documents => Some(&mut self.documents),
            SheetRole::Permits => Some(&mut self.permits),
        }
    }

    /// Replace the projects collection wholesale
    pub fn replace_projects(&mut self, projects: Vec<ProjectRecord>) {
        self.projects = projects;
    }

    /// Replace one dependent collection wholesale
    ///
    /// Ignored for [`SheetRole::Projects`]; projects go through
    /// [`DashboardState::replace_projects`].
    pub fn replace_dependent(&mut self, role: SheetRole, rows: Vec<SheetRow>) {
        if let Some(collection) = self.dependent_mut(role) {
            *collection = rows;
        }
    }

    /// Drop dependent rows whose stamped code matches `is_orphan`;
    /// returns how many rows were removed across all six collections.
    pub fn purge_dependents(&mut self, is_orphan: impl Fn(&str) -> bool) -> usize {
        let mut removed = 0;
        for role in SheetRole::dependents() {
            if let Some(collection) = self.dependent_mut(role) {
                let before = collection.len();
                collection.retain(|row| !is_orphan(&row.project_code()));
                removed += before - collection.len();
            }
        }
        removed
    }

    pub fn record_upload(&mut self, entry: UploadEntry) {
        self.upload_history.push(entry);
    }

    pub fn record_report(&mut self, entry: ReportEntry) {
        self.generated_reports.push(entry);
    }

    /// Filter options for project drop-downs: the "all" sentinel followed
    /// by every project display name in collection order.
    pub fn project_filter_options(&self) -> Vec<String> {
        let mut options = vec![crate::registry::ALL_PROJECTS.to_string()];
        options.extend(self.projects.iter().map(|p| p.name.clone()));
        options
    }
}
