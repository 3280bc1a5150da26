//! Permissive sheet-row model
//!
//! Uploaded workbooks carry no enforced schema: every sheet is an ordered
//! sequence of flat string-keyed records. `SheetRow` wraps one such record
//! and offers best-effort typed accessors with defaults, so ingestion and
//! reporting never fail on a missing or oddly-typed cell.

use crate::events::NotificationLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known field names used by the resolver, classifier and reports.
///
/// These match the column headers of the upload feed; all reads through
/// them are permissive (absent fields read as empty/zero).
pub mod fields {
    pub const PROJECT_ID: &str = "Project_ID";
    pub const PROJECT_NAME: &str = "Project_Name";
    pub const STATUS: &str = "Status";
    pub const PROGRESS_PERCENT: &str = "Progress_Percent";
    pub const BUDGET_USED_PERCENT: &str = "Budget_Used_Percent";
    pub const SAFETY_SCORE: &str = "Safety_Score";
    pub const TOTAL_MANPOWER: &str = "Total_Manpower";
    pub const SAFE_MAN_HOURS: &str = "Safe_Man_Hours";
    pub const FATAL_ACCIDENTS: &str = "Fatal_Accidents";
    pub const LOST_TIME_INJURIES: &str = "Lost_Time_Injuries";
    pub const MEDICAL_TREATMENT_CASES: &str = "Medical_Treatment_Cases";
    pub const FIRST_AID_CASES: &str = "First_Aid_Cases";
}

/// One flat record from an uploaded sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetRow(Map<String, Value>);

impl SheetRow {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a field as a trimmed string; absent, null or non-scalar
    /// values read as the empty string. Numbers render as text.
    pub fn field_str(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Read a field as a non-empty trimmed string
    pub fn opt_field_str(&self, key: &str) -> Option<String> {
        let value = self.field_str(key);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Read a field as a number; numeric strings parse, everything
    /// else reads as 0.0
    pub fn field_f64(&self, key: &str) -> f64 {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// The row's project code field, trimmed ("" when absent)
    pub fn project_code(&self) -> String {
        self.field_str(fields::PROJECT_ID)
    }

    /// The row's project name field, trimmed ("" when absent)
    pub fn project_name(&self) -> String {
        self.field_str(fields::PROJECT_NAME)
    }

    /// Stamp the row with a resolved project code
    pub fn set_project_code(&mut self, code: &str) {
        self.set(fields::PROJECT_ID, code);
    }
}

/// A committed project record
///
/// `code` is the stable identifier, `name` the display label. Within one
/// dashboard snapshot both are unique by construction of the upload feed.
/// Columns the dashboard does not interpret are retained in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub code: String,
    pub name: String,
    pub progress_percent: f64,
    pub budget_used_percent: f64,
    pub safety_score: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectRecord {
    /// Build a record from an uploaded Projects-sheet row
    ///
    /// Interpreted columns are lifted into typed fields; the remainder is
    /// carried along untouched.
    pub fn from_row(row: &SheetRow) -> Self {
        let mut extra = row.clone().into_map();
        for key in [
            fields::PROJECT_ID,
            fields::PROJECT_NAME,
            fields::PROGRESS_PERCENT,
            fields::BUDGET_USED_PERCENT,
            fields::SAFETY_SCORE,
        ] {
            extra.remove(key);
        }

        Self {
            code: row.project_code(),
            name: row.project_name(),
            progress_percent: row.field_f64(fields::PROGRESS_PERCENT),
            budget_used_percent: row.field_f64(fields::BUDGET_USED_PERCENT),
            safety_score: row.field_f64(fields::SAFETY_SCORE),
            extra,
        }
    }
}

/// Map a free-form status string onto a display severity
///
/// open/planned read as informational, in-progress as warning,
/// completed/closed as success; anything unrecognized stays informational.
pub fn status_severity(status: &str) -> NotificationLevel {
    let s = status.to_lowercase();
    if s.is_empty() {
        return NotificationLevel::Info;
    }
    if s.contains("open") || s.contains("planned") {
        NotificationLevel::Info
    } else if s.contains("progress") {
        NotificationLevel::Warning
    } else if s.contains("completed") || s.contains("closed") {
        NotificationLevel::Success
    } else {
        NotificationLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> SheetRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn field_str_trims_and_defaults() {
        let r = row(json!({"Project_Name": "  Petani Substation  ", "Count": 3}));
        assert_eq!(r.field_str("Project_Name"), "Petani Substation");
        assert_eq!(r.field_str("Count"), "3");
        assert_eq!(r.field_str("Missing"), "");
        assert_eq!(r.opt_field_str("Missing"), None);
    }

    #[test]
    fn field_f64_parses_numeric_strings() {
        let r = row(json!({"Progress_Percent": "72.5", "Safety_Score": 90, "Notes": "n/a"}));
        assert_eq!(r.field_f64("Progress_Percent"), 72.5);
        assert_eq!(r.field_f64("Safety_Score"), 90.0);
        assert_eq!(r.field_f64("Notes"), 0.0);
        assert_eq!(r.field_f64("Missing"), 0.0);
    }

    #[test]
    fn project_record_lifts_known_columns() {
        let r = row(json!({
            "Project_ID": " PROJ002 ",
            "Project_Name": "Menggala Substation",
            "Progress_Percent": 55,
            "Budget_Used_Percent": 48.2,
            "Safety_Score": 91,
            "Region": "Sumatra"
        }));
        let record = ProjectRecord::from_row(&r);
        assert_eq!(record.code, "PROJ002");
        assert_eq!(record.name, "Menggala Substation");
        assert_eq!(record.progress_percent, 55.0);
        assert_eq!(record.budget_used_percent, 48.2);
        assert_eq!(record.safety_score, 91.0);
        assert_eq!(record.extra.get("Region"), Some(&json!("Sumatra")));
        assert!(!record.extra.contains_key("Project_ID"));
    }

    #[test]
    fn status_severity_mapping() {
        assert_eq!(status_severity(""), NotificationLevel::Info);
        assert_eq!(status_severity("Open"), NotificationLevel::Info);
        assert_eq!(status_severity("Planned for Q3"), NotificationLevel::Info);
        assert_eq!(status_severity("In Progress"), NotificationLevel::Warning);
        assert_eq!(status_severity("Completed"), NotificationLevel::Success);
        assert_eq!(status_severity("Closed early"), NotificationLevel::Success);
        assert_eq!(status_severity("On Hold"), NotificationLevel::Info);
    }
}
