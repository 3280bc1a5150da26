//! Sheet classification
//!
//! Uploaded workbooks name their sheets freely ("Project List",
//! "projects_2024", "Safety Log"). Classification maps each logical role to
//! at most one sheet via a declarative trigger table of lowercase
//! substrings; adding a role means adding a table entry, not touching the
//! pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The seven logical entities a sheet can be classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetRole {
    Projects,
    SCurve,
    Safety,
    Issues,
    Plans,
    Documents,
    Permits,
}

impl SheetRole {
    /// All roles, Projects first (commit order matters downstream)
    pub const ALL: [SheetRole; 7] = [
        SheetRole::Projects,
        SheetRole::SCurve,
        SheetRole::Safety,
        SheetRole::Issues,
        SheetRole::Plans,
        SheetRole::Documents,
        SheetRole::Permits,
    ];

    /// The six roles resolved against the projects collection
    pub fn dependents() -> impl Iterator<Item = SheetRole> {
        Self::ALL.into_iter().filter(|r| *r != SheetRole::Projects)
    }

    /// Human-readable role label, used in summaries and audit entries
    pub fn label(&self) -> &'static str {
        match self {
            SheetRole::Projects => "Projects",
            SheetRole::SCurve => "S-Curve",
            SheetRole::Safety => "Safety",
            SheetRole::Issues => "Issues",
            SheetRole::Plans => "Plans",
            SheetRole::Documents => "Documents",
            SheetRole::Permits => "Permits",
        }
    }

    /// Lowercase substrings that claim a sheet for this role
    fn triggers(&self) -> &'static [&'static str] {
        match self {
            SheetRole::Projects => &["project"],
            SheetRole::SCurve => &["s_curve", "scurve"],
            SheetRole::Safety => &["safety"],
            SheetRole::Issues => &["issue"],
            SheetRole::Plans => &["plan"],
            SheetRole::Documents => &["document"],
            SheetRole::Permits => &["permit"],
        }
    }

    /// Parse a role from its label (case-insensitive), for API paths
    pub fn from_label(label: &str) -> Option<SheetRole> {
        let wanted = label.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.label().to_lowercase() == wanted)
    }
}

/// Map workbook sheet names onto roles
///
/// For each role independently, the first sheet (in workbook order) whose
/// lowercased name contains one of the role's triggers wins. Unmatched
/// sheets are ignored; a workbook supplies zero or one sheet per role.
/// Returns role → index into `sheet_names`.
pub fn classify_sheets(sheet_names: &[String]) -> HashMap<SheetRole, usize> {
    let lowered: Vec<String> = sheet_names.iter().map(|n| n.to_lowercase()).collect();

    let mut assignment = HashMap::new();
    for role in SheetRole::ALL {
        let matched = lowered
            .iter()
            .position(|name| role.triggers().iter().any(|t| name.contains(t)));
        if let Some(index) = matched {
            assignment.insert(role, index);
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fuzzy_names_classify() {
        let sheets = names(&[
            "Project List",
            "S_Curve Data",
            "Safety Log 2024",
            "Open Issues",
            "Action Plans",
            "Document Register",
            "Permit Tracker",
        ]);
        let roles = classify_sheets(&sheets);

        assert_eq!(roles[&SheetRole::Projects], 0);
        assert_eq!(roles[&SheetRole::SCurve], 1);
        assert_eq!(roles[&SheetRole::Safety], 2);
        assert_eq!(roles[&SheetRole::Issues], 3);
        assert_eq!(roles[&SheetRole::Plans], 4);
        assert_eq!(roles[&SheetRole::Documents], 5);
        assert_eq!(roles[&SheetRole::Permits], 6);
    }

    #[test]
    fn scurve_matches_both_spellings() {
        let roles = classify_sheets(&names(&["SCurve"]));
        assert_eq!(roles.get(&SheetRole::SCurve), Some(&0));

        let roles = classify_sheets(&names(&["weekly s_curve"]));
        assert_eq!(roles.get(&SheetRole::SCurve), Some(&0));
    }

    #[test]
    fn first_matching_sheet_wins_per_role() {
        let sheets = names(&["projects_old", "projects_2024"]);
        let roles = classify_sheets(&sheets);
        assert_eq!(roles[&SheetRole::Projects], 0);
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn unmatched_sheets_are_ignored() {
        let roles = classify_sheets(&names(&["Notes", "Random"]));
        assert!(roles.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let roles = classify_sheets(&names(&["PROJECTS", "SAFETY"]));
        assert_eq!(roles[&SheetRole::Projects], 0);
        assert_eq!(roles[&SheetRole::Safety], 1);
    }

    #[test]
    fn role_labels_round_trip() {
        for role in SheetRole::ALL {
            assert_eq!(SheetRole::from_label(role.label()), Some(role));
        }
        assert_eq!(SheetRole::from_label("s-curve"), Some(SheetRole::SCurve));
        assert_eq!(SheetRole::from_label("nope"), None);
    }
}
