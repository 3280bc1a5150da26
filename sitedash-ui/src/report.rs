//! Report aggregation and artifact generation
//!
//! Aggregation helpers are pure read functions over `DashboardState`; an
//! external slide-deck renderer consumes them through the [`SlideRenderer`]
//! seam. When no renderer is installed, or the installed one fails, a
//! plain-text artifact with the same figures is produced instead — report
//! generation itself never fails.

use crate::registry::ALL_PROJECTS;
use crate::state::DashboardState;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitedash_common::events::NotificationLevel;
use sitedash_common::rows::fields;
use tracing::{error, warn};

/// One report request: type label, project filter ("all" or one display
/// name), and a reporting period.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub report_type: String,
    pub project: String,
    pub start_date: String,
    pub end_date: String,
}

/// Aggregate figures consumed by report renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFigures {
    pub total_projects: usize,
    pub avg_progress: f64,
    pub avg_safety_score: f64,
    pub avg_budget_used: f64,
    pub active_permits: usize,
    pub total_issues: usize,
    pub total_plans: usize,
    pub total_manpower: f64,
    pub safe_man_hours: f64,
    pub incident_total: f64,
}

/// Aggregate dashboard figures for one project filter
///
/// Project averages respect the filter; safety sums, permit and
/// issue/plan counts are fleet-wide, matching the dashboard tiles.
pub fn aggregate(state: &DashboardState, project: &str) -> ReportFigures {
    let filtered: Vec<_> = if project == ALL_PROJECTS {
        state.projects.iter().collect()
    } else {
        state.projects.iter().filter(|p| p.name == project).collect()
    };

    let count = filtered.len();
    let avg = |f: fn(&sitedash_common::rows::ProjectRecord) -> f64| -> f64 {
        if count == 0 {
            0.0
        } else {
            filtered.iter().map(|p| f(p)).sum::<f64>() / count as f64
        }
    };

    let active_permits = state
        .permits
        .iter()
        .filter(|row| row.field_str(fields::STATUS) == "Open")
        .count();

    let sum_field = |key: &str| -> f64 { state.safety.iter().map(|row| row.field_f64(key)).sum() };

    let incident_total = sum_field(fields::FATAL_ACCIDENTS)
        + sum_field(fields::LOST_TIME_INJURIES)
        + sum_field(fields::MEDICAL_TREATMENT_CASES)
        + sum_field(fields::FIRST_AID_CASES);

    ReportFigures {
        total_projects: count,
        avg_progress: avg(|p| p.progress_percent),
        avg_safety_score: avg(|p| p.safety_score),
        avg_budget_used: avg(|p| p.budget_used_percent),
        active_permits,
        total_issues: state.issues.len(),
        total_plans: state.plans.len(),
        total_manpower: sum_field(fields::TOTAL_MANPOWER),
        safe_man_hours: sum_field(fields::SAFE_MAN_HOURS),
        incident_total,
    }
}

/// A generated report artifact
#[derive(Debug, Clone, Serialize)]
pub struct ReportArtifact {
    pub filename: String,
    pub content_type: String,
    /// UTF-8 artifact body (slide decks would be binary; the built-in
    /// fallback is plain text)
    pub content: String,
}

/// Seam for an external slide-deck renderer
pub trait SlideRenderer: Send + Sync {
    fn render(&self, request: &ReportRequest, figures: &ReportFigures)
        -> anyhow::Result<ReportArtifact>;
}

/// Plain-text artifact carrying the same aggregate figures a slide deck
/// would show
pub fn fallback_artifact(request: &ReportRequest, figures: &ReportFigures) -> ReportArtifact {
    let scope = if request.project == ALL_PROJECTS {
        "All Projects".to_string()
    } else {
        request.project.clone()
    };

    let content = format!(
        "Construction {} Report\n\
         Scope: {}\n\
         Period: {} - {}\n\
         Generated: {}\n\
         \n\
         Total Projects: {}\n\
         Average Progress: {:.1}%\n\
         Average Safety Score: {:.1}%\n\
         Average Budget Used: {:.1}%\n\
         Active Permits: {}\n\
         Open Issues: {}\n\
         Active Plans: {}\n\
         Total Manpower: {:.0}\n\
         Safe Man Hours: {:.0}\n\
         Total Incidents: {:.0}\n",
        request.report_type,
        scope,
        request.start_date,
        request.end_date,
        Utc::now().to_rfc3339(),
        figures.total_projects,
        figures.avg_progress,
        figures.avg_safety_score,
        figures.avg_budget_used,
        figures.active_permits,
        figures.total_issues,
        figures.total_plans,
        figures.total_manpower,
        figures.safe_man_hours,
        figures.incident_total,
    );

    ReportArtifact {
        filename: format!(
            "sitedash_{}_report_{}_{}.txt",
            request.report_type, request.start_date, request.end_date
        ),
        content_type: "text/plain".to_string(),
        content,
    }
}

/// Outcome of one report generation
pub struct ReportOutcome {
    pub artifact: ReportArtifact,
    /// Whether the fallback path produced the artifact
    pub fallback: bool,
    /// Notification shown to the user
    pub notification: (String, NotificationLevel),
}

/// Builds reports through the renderer seam with local error recovery
pub struct ReportBuilder {
    renderer: Option<Box<dyn SlideRenderer>>,
}

impl ReportBuilder {
    /// Builder without a slide renderer; every report takes the fallback
    /// path with a warning.
    pub fn new() -> Self {
        Self { renderer: None }
    }

    pub fn with_renderer(renderer: Box<dyn SlideRenderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    /// Generate a report artifact
    ///
    /// Renderer absence degrades to the fallback with a warning;
    /// a renderer error degrades to the fallback with an error
    /// notification carrying the underlying message. Neither propagates.
    pub fn generate(&self, state: &DashboardState, request: &ReportRequest) -> ReportOutcome {
        let figures = aggregate(state, &request.project);

        match &self.renderer {
            None => {
                warn!(report_type = %request.report_type, "Slide renderer unavailable, using fallback report");
                ReportOutcome {
                    artifact: fallback_artifact(request, &figures),
                    fallback: true,
                    notification: (
                        "Slide renderer unavailable; generated fallback report".to_string(),
                        NotificationLevel::Warning,
                    ),
                }
            }
            Some(renderer) => match renderer.render(request, &figures) {
                Ok(artifact) => ReportOutcome {
                    artifact,
                    fallback: false,
                    notification: (
                        format!("{} report downloaded", request.report_type),
                        NotificationLevel::Success,
                    ),
                },
                Err(e) => {
                    error!(report_type = %request.report_type, error = %e, "Slide renderer failed, using fallback report");
                    ReportOutcome {
                        artifact: fallback_artifact(request, &figures),
                        fallback: true,
                        notification: (
                            format!("Report rendering failed: {e}; generated fallback report"),
                            NotificationLevel::Error,
                        ),
                    }
                }
            },
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SheetRole;
    use serde_json::json;
    use sitedash_common::rows::SheetRow;

    fn rows(values: serde_json::Value) -> Vec<SheetRow> {
        serde_json::from_value(values).unwrap()
    }

    fn request(project: &str) -> ReportRequest {
        ReportRequest {
            report_type: "weekly".to_string(),
            project: project.to_string(),
            start_date: "2024-06-01".to_string(),
            end_date: "2024-06-07".to_string(),
        }
    }

    fn sample_state() -> DashboardState {
        let mut state = DashboardState::seeded();
        state.replace_dependent(
            SheetRole::Safety,
            rows(json!([
                {"Project_ID": "PROJ001", "Total_Manpower": 120, "Safe_Man_Hours": 9600,
                 "Lost_Time_Injuries": 1, "First_Aid_Cases": 3},
                {"Project_ID": "PROJ002", "Total_Manpower": 80, "Safe_Man_Hours": 6400,
                 "Medical_Treatment_Cases": 2}
            ])),
        );
        state.replace_dependent(
            SheetRole::Permits,
            rows(json!([
                {"Project_ID": "PROJ001", "Status": "Open"},
                {"Project_ID": "PROJ001", "Status": "Closed"},
                {"Project_ID": "PROJ002", "Status": "Open"}
            ])),
        );
        state.replace_dependent(
            SheetRole::Issues,
            rows(json!([{"Project_ID": "PROJ001", "Issue_Title": "X"}])),
        );
        state
    }

    #[test]
    fn aggregate_all_projects() {
        let state = sample_state();
        let figures = aggregate(&state, "all");

        assert_eq!(figures.total_projects, 7);
        assert_eq!(figures.active_permits, 2);
        assert_eq!(figures.total_issues, 1);
        assert_eq!(figures.total_manpower, 200.0);
        assert_eq!(figures.safe_man_hours, 16000.0);
        assert_eq!(figures.incident_total, 6.0);
        // Seed average progress: (72+58+81+34+46+63+27)/7
        assert!((figures.avg_progress - 54.428).abs() < 0.01);
    }

    #[test]
    fn aggregate_single_project_filter() {
        let state = sample_state();
        let figures = aggregate(&state, "Petani Substation");

        assert_eq!(figures.total_projects, 1);
        assert_eq!(figures.avg_progress, 72.0);
        assert_eq!(figures.avg_safety_score, 92.0);
        // Fleet-wide counts are unaffected by the project filter.
        assert_eq!(figures.active_permits, 2);
    }

    #[test]
    fn aggregate_unknown_project_is_zeroed() {
        let state = sample_state();
        let figures = aggregate(&state, "No Such Project");
        assert_eq!(figures.total_projects, 0);
        assert_eq!(figures.avg_progress, 0.0);
    }

    #[test]
    fn missing_renderer_falls_back_with_warning() {
        let state = sample_state();
        let builder = ReportBuilder::new();
        let outcome = builder.generate(&state, &request("all"));

        assert!(outcome.fallback);
        assert_eq!(outcome.notification.1, NotificationLevel::Warning);
        assert!(outcome.artifact.content.contains("Total Projects: 7"));
        assert!(outcome.artifact.content.contains("All Projects"));
        assert_eq!(outcome.artifact.content_type, "text/plain");
    }

    struct FailingRenderer;
    impl SlideRenderer for FailingRenderer {
        fn render(
            &self,
            _request: &ReportRequest,
            _figures: &ReportFigures,
        ) -> anyhow::Result<ReportArtifact> {
            anyhow::bail!("asset fetch failed")
        }
    }

    #[test]
    fn renderer_failure_falls_back_with_error() {
        let state = sample_state();
        let builder = ReportBuilder::with_renderer(Box::new(FailingRenderer));
        let outcome = builder.generate(&state, &request("Balam SS"));

        assert!(outcome.fallback);
        assert_eq!(outcome.notification.1, NotificationLevel::Error);
        assert!(outcome.notification.0.contains("asset fetch failed"));
        assert!(outcome.artifact.content.contains("Balam SS"));
    }

    struct StubRenderer;
    impl SlideRenderer for StubRenderer {
        fn render(
            &self,
            request: &ReportRequest,
            _figures: &ReportFigures,
        ) -> anyhow::Result<ReportArtifact> {
            Ok(ReportArtifact {
                filename: format!("{}.pptx", request.report_type),
                content_type: "application/vnd.openxmlformats-officedocument.presentationml.presentation".to_string(),
                content: String::new(),
            })
        }
    }

    #[test]
    fn working_renderer_is_used_directly() {
        let state = sample_state();
        let builder = ReportBuilder::with_renderer(Box::new(StubRenderer));
        let outcome = builder.generate(&state, &request("all"));

        assert!(!outcome.fallback);
        assert_eq!(outcome.notification.1, NotificationLevel::Success);
        assert_eq!(outcome.artifact.filename, "weekly.pptx");
    }
}
