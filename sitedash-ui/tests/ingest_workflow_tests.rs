//! Ingestion workflow integration tests
//!
//! Exercises the full pipeline against in-memory state with JSON
//! workbooks: projects-first commit, registry rebuild, dependent
//! resolution ordering, orphan purge and idempotency.

use sitedash_common::events::EventBus;
use sitedash_ui::ingest::IngestionPipeline;
use sitedash_ui::registry::IdentifierRegistry;
use sitedash_ui::resolver::UNRESOLVED_CODE;
use sitedash_ui::state::DashboardState;

struct Harness {
    dashboard: DashboardState,
    registry: IdentifierRegistry,
    pipeline: IngestionPipeline,
}

impl Harness {
    fn new() -> Self {
        let dashboard = DashboardState::seeded();
        let mut registry = IdentifierRegistry::new();
        registry.rebuild(&dashboard.projects);
        Self {
            dashboard,
            registry,
            pipeline: IngestionPipeline::new(EventBus::new(64)),
        }
    }

    fn ingest(
        &mut self,
        filename: &str,
        blob: &str,
    ) -> sitedash_common::Result<sitedash_ui::ingest::IngestSummary> {
        self.pipeline
            .ingest(&mut self.dashboard, &mut self.registry, filename, blob.as_bytes())
    }
}

#[test]
fn projects_sheet_replaces_collection_and_rebuilds_registry() {
    // Given: seed registry maps PROJ001 -> "Petani Substation"
    let mut h = Harness::new();
    assert_eq!(h.registry.name_for("PROJ001"), "Petani Substation");

    // When: a workbook with one new project and one codeless issue arrives
    let blob = r#"{
        "Projects": [{"Project_ID": "PROJ009", "Project_Name": "New Site"}],
        "Issues": [{"Project_Name": "New Site", "Issue_Title": "X"}]
    }"#;
    let summary = h.ingest("upload.json", blob).unwrap();

    // Then: the registry absorbed the new project
    assert_eq!(h.registry.code_for("New Site"), Some("PROJ009"));

    // The issue resolved through the rebuilt registry
    assert_eq!(h.dashboard.issues.len(), 1);
    assert_eq!(h.dashboard.issues[0].project_code(), "PROJ009");

    // The old seed project list is fully replaced
    assert_eq!(h.dashboard.projects.len(), 1);
    assert_eq!(h.dashboard.projects[0].code, "PROJ009");

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.purged_rows, 0);
    assert_eq!(summary.processed_sheets, vec!["Projects", "Issues"]);
}

#[test]
fn orphan_rows_are_purged_and_counted() {
    let mut h = Harness::new();

    let blob = r#"{
        "Issues": [
            {"Project_Name": "Petani Substation", "Issue_Title": "resolves"},
            {"Project_Name": "Ghost Plant", "Issue_Title": "orphan 1"},
            {"Issue_Title": "orphan 2"}
        ]
    }"#;
    let summary = h.ingest("issues.json", blob).unwrap();

    // The pre-purge count exceeds the surviving collection by exactly the
    // number of orphans.
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.purged_rows, 2);
    assert_eq!(
        summary.total_rows - summary.purged_rows,
        h.dashboard.issues.len()
    );
    assert_eq!(h.dashboard.issues[0].field_str("Issue_Title"), "resolves");
}

#[test]
fn purge_invariant_no_unresolved_codes_survive() {
    let mut h = Harness::new();

    let blob = r#"{
        "Safety": [
            {"Project_ID": "PROJ003", "Total_Manpower": 50},
            {"Project_Name": "Nowhere", "Total_Manpower": 10}
        ],
        "Permits": [
            {"Project_Name": "Balam SS", "Status": "Open"},
            {"Permit_Type": "codeless orphan"}
        ]
    }"#;
    h.ingest("mixed.json", blob).unwrap();

    for rows in [&h.dashboard.safety, &h.dashboard.permits] {
        for row in rows.iter() {
            let code = row.project_code();
            assert!(!code.is_empty());
            assert_ne!(code, UNRESOLVED_CODE);
        }
    }
    assert_eq!(h.dashboard.safety.len(), 1);
    assert_eq!(h.dashboard.permits.len(), 1);
    assert_eq!(h.dashboard.permits[0].project_code(), "PROJ005");
}

#[test]
fn issues_only_workbook_leaves_projects_and_registry_untouched() {
    let mut h = Harness::new();
    let projects_before = h.dashboard.projects.clone();
    let registry_size_before = h.registry.len();

    let blob = r#"{
        "Issues": [{"Project_Name": "Sintong SS", "Issue_Title": "seed resolve"}]
    }"#;
    let summary = h.ingest("issues_only.json", blob).unwrap();

    assert_eq!(h.dashboard.projects, projects_before);
    assert_eq!(h.registry.len(), registry_size_before);
    assert_eq!(h.dashboard.issues[0].project_code(), "PROJ006");
    assert_eq!(summary.processed_sheets, vec!["Issues"]);
}

#[test]
fn ingestion_is_idempotent() {
    let mut h = Harness::new();

    let blob = r#"{
        "Projects": [
            {"Project_ID": "PROJ009", "Project_Name": "New Site", "Progress_Percent": 40},
            {"Project_ID": "PROJ010", "Project_Name": "Delta Yard", "Progress_Percent": 10}
        ],
        "Issues": [
            {"Project_Name": "New Site", "Issue_Title": "A"},
            {"Project_Name": "Unknown Yard", "Issue_Title": "orphan"}
        ],
        "Plans": [{"Project_ID": "PROJ010", "Plan_Title": "P"}]
    }"#;

    let first = h.ingest("twice.json", blob).unwrap();
    let projects_after_first = h.dashboard.projects.clone();
    let issues_after_first = h.dashboard.issues.clone();
    let plans_after_first = h.dashboard.plans.clone();

    let second = h.ingest("twice.json", blob).unwrap();

    assert_eq!(h.dashboard.projects, projects_after_first);
    assert_eq!(h.dashboard.issues, issues_after_first);
    assert_eq!(h.dashboard.plans, plans_after_first);
    assert_eq!(first.total_rows, second.total_rows);
    assert_eq!(first.purged_rows, second.purged_rows);
}

#[test]
fn projects_code_backfills_from_previous_registry() {
    let mut h = Harness::new();

    // A legacy Projects sheet naming a seeded project without its code.
    let blob = r#"{
        "Projects": [
            {"Project_Name": "Petani Substation", "Progress_Percent": 80},
            {"Project_ID": "PROJ011", "Project_Name": "Fresh Site"}
        ]
    }"#;
    h.ingest("legacy.json", blob).unwrap();

    assert_eq!(h.dashboard.projects[0].code, "PROJ001");
    assert_eq!(h.dashboard.projects[1].code, "PROJ011");
    assert_eq!(h.registry.code_for("Fresh Site"), Some("PROJ011"));
}

#[test]
fn explicit_code_beats_name_lookup_end_to_end() {
    let mut h = Harness::new();

    let blob = r#"{
        "Documents": [
            {"Project_ID": "PROJ004", "Project_Name": "Petani Substation", "Doc_Title": "D"}
        ]
    }"#;
    h.ingest("docs.json", blob).unwrap();

    // Name maps to PROJ001, but the explicit code wins.
    assert_eq!(h.dashboard.documents[0].project_code(), "PROJ004");
}

#[test]
fn malformed_workbook_aborts_without_mutation() {
    let mut h = Harness::new();
    let before = h.dashboard.clone();

    let result = h.ingest("garbage.bin", "\x01\x02 not a workbook");

    assert!(result.is_err());
    assert_eq!(h.dashboard, before);
    assert!(h.dashboard.upload_history.is_empty());
}

#[test]
fn empty_sheets_are_treated_as_absent() {
    let mut h = Harness::new();

    let blob = r#"{
        "Projects": [],
        "Issues": [{"Project_Name": "Balam SS", "Issue_Title": "only sheet"}]
    }"#;
    let summary = h.ingest("sparse.json", blob).unwrap();

    // The empty Projects sheet is dropped, so the seed projects survive.
    assert_eq!(h.dashboard.projects.len(), 7);
    assert_eq!(summary.processed_sheets, vec!["Issues"]);
}

#[test]
fn upload_history_records_audit_entry() {
    let mut h = Harness::new();

    let blob = r#"{"Issues": [{"Project_Name": "Balam SS", "Issue_Title": "A"}]}"#;
    let summary = h.ingest("audit.json", blob).unwrap();

    assert_eq!(h.dashboard.upload_history.len(), 1);
    let entry = &h.dashboard.upload_history[0];
    assert_eq!(entry.upload_id, summary.upload_id);
    assert_eq!(entry.filename, "audit.json");
    assert_eq!(entry.size_bytes, blob.len());
    assert_eq!(entry.row_count, 1);
    assert_eq!(entry.processed_sheets, vec!["Issues"]);
}

#[test]
fn fuzzy_sheet_names_classify_end_to_end() {
    let mut h = Harness::new();

    let blob = r#"{
        "Project List 2024": [{"Project_ID": "PROJ020", "Project_Name": "Quay Wall"}],
        "Weekly S_Curve": [{"Project_Name": "Quay Wall", "Week": 1, "Planned": 5, "Actual": 4}],
        "safety log": [{"Project_Name": "Quay Wall", "Total_Manpower": 44}]
    }"#;
    let summary = h.ingest("fuzzy.json", blob).unwrap();

    assert_eq!(summary.processed_sheets, vec!["Projects", "S-Curve", "Safety"]);
    assert_eq!(h.dashboard.s_curve[0].project_code(), "PROJ020");
    assert_eq!(h.dashboard.safety[0].project_code(), "PROJ020");
}
