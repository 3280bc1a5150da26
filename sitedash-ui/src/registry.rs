//! Project identifier registry
//!
//! Authoritative bidirectional mapping between stable project codes and
//! human-readable project names. Seeded from a static table so legacy
//! uploads without a Projects sheet still resolve; rebuilt in full (seed
//! plus observed projects) every time a Projects sheet commits — never
//! partially patched.

use sitedash_common::rows::ProjectRecord;
use std::collections::HashMap;
use tracing::debug;

/// Display label returned for an empty or absent project code
pub const UNKNOWN_PROJECT_LABEL: &str = "Unknown Project";

/// Filter sentinel meaning "no project filter"
pub const ALL_PROJECTS: &str = "all";

/// Static fallback table of known code/name pairs
///
/// Backfills codes on legacy data and keeps name lookups working when an
/// uploaded dataset lacks explicit project rows.
pub const SEED_PROJECT_TABLE: [(&str, &str); 7] = [
    ("PROJ001", "Petani Substation"),
    ("PROJ002", "Menggala Substation"),
    ("PROJ003", "Nella Substation"),
    ("PROJ004", "Bangko Substation"),
    ("PROJ005", "Balam SS"),
    ("PROJ006", "Sintong SS"),
    ("PROJ007", "OKB Substation"),
];

/// Bidirectional code ↔ name registry
///
/// The two maps are exact inverses for every entry derived from known
/// project rows. Lookups never fail; unknown inputs fall through to
/// documented defaults.
#[derive(Debug, Clone)]
pub struct IdentifierRegistry {
    code_to_name: HashMap<String, String>,
    name_to_code: HashMap<String, String>,
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierRegistry {
    /// Registry holding only the seed table
    pub fn new() -> Self {
        let mut registry = Self {
            code_to_name: HashMap::new(),
            name_to_code: HashMap::new(),
        };
        registry.rebuild(&[]);
        registry
    }

    /// Rebuild both maps from scratch: seed table first, then every
    /// project in order.
    ///
    /// Later projects override earlier entries sharing a code or name
    /// (last-write-wins, including over the seed table). After rebuild,
    /// every project with a non-empty trimmed code and name is present in
    /// both directions.
    pub fn rebuild(&mut self, projects: &[ProjectRecord]) {
        self.code_to_name.clear();
        self.name_to_code.clear();

        for (code, name) in SEED_PROJECT_TABLE {
            self.code_to_name.insert(code.to_string(), name.to_string());
            self.name_to_code.insert(name.to_string(), code.to_string());
        }

        for project in projects {
            let code = project.code.trim();
            let name = project.name.trim();
            if code.is_empty() || name.is_empty() {
                continue;
            }
            if let Some(existing) = self.code_to_name.get(code) {
                if existing != name {
                    debug!(code, old = %existing, new = %name, "Registry override for project code");
                }
            }
            self.code_to_name.insert(code.to_string(), name.to_string());
            self.name_to_code.insert(name.to_string(), code.to_string());
        }
    }

    /// Display name for a code
    ///
    /// Returns the mapped name, the code itself when unmapped, or
    /// [`UNKNOWN_PROJECT_LABEL`] for an empty code. Never fails.
    pub fn name_for(&self, code: &str) -> String {
        let code = code.trim();
        if code.is_empty() {
            return UNKNOWN_PROJECT_LABEL.to_string();
        }
        self.code_to_name
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    /// Code for a display name
    ///
    /// Returns `None` for an empty name, the [`ALL_PROJECTS`] sentinel, or
    /// an unmapped name. Never fails.
    pub fn code_for(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if name.is_empty() || name == ALL_PROJECTS {
            return None;
        }
        self.name_to_code.get(name).map(String::as_str)
    }

    /// Number of known code/name pairs
    pub fn len(&self) -> usize {
        self.code_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_to_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(code: &str, name: &str) -> ProjectRecord {
        ProjectRecord {
            code: code.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn seeded_registry_maps_both_directions() {
        let registry = IdentifierRegistry::new();
        assert_eq!(registry.name_for("PROJ001"), "Petani Substation");
        assert_eq!(registry.code_for("Petani Substation"), Some("PROJ001"));
        assert_eq!(registry.len(), SEED_PROJECT_TABLE.len());
    }

    #[test]
    fn name_for_falls_back_to_code_then_placeholder() {
        let registry = IdentifierRegistry::new();
        assert_eq!(registry.name_for("PROJ999"), "PROJ999");
        assert_eq!(registry.name_for(""), UNKNOWN_PROJECT_LABEL);
        assert_eq!(registry.name_for("   "), UNKNOWN_PROJECT_LABEL);
    }

    #[test]
    fn code_for_rejects_empty_and_all_sentinel() {
        let registry = IdentifierRegistry::new();
        assert_eq!(registry.code_for(""), None);
        assert_eq!(registry.code_for("all"), None);
        assert_eq!(registry.code_for("No Such Project"), None);
    }

    #[test]
    fn rebuild_round_trips_committed_projects() {
        let mut registry = IdentifierRegistry::new();
        let projects = vec![project("PROJ009", "New Site"), project("PROJ010", "Delta Yard")];
        registry.rebuild(&projects);

        for p in &projects {
            let name = registry.name_for(&p.code);
            assert_eq!(registry.code_for(&name), Some(p.code.as_str()));
        }
    }

    #[test]
    fn rebuild_skips_blank_code_or_name() {
        let mut registry = IdentifierRegistry::new();
        registry.rebuild(&[project("", "Nameless"), project("PROJ042", "  ")]);
        assert_eq!(registry.code_for("Nameless"), None);
        assert_eq!(registry.name_for("PROJ042"), "PROJ042");
    }

    #[test]
    fn later_projects_override_seed_entries() {
        // Last-write-wins, including over the seed table.
        let mut registry = IdentifierRegistry::new();
        registry.rebuild(&[project("PROJ001", "Renamed Substation")]);
        assert_eq!(registry.name_for("PROJ001"), "Renamed Substation");
        assert_eq!(registry.code_for("Renamed Substation"), Some("PROJ001"));
        // The seed's inverse entry is not removed: both names map to the
        // code, while code→name reflects only the latest write.
        assert_eq!(registry.code_for("Petani Substation"), Some("PROJ001"));
    }

    #[test]
    fn rebuild_clears_previous_observations() {
        let mut registry = IdentifierRegistry::new();
        registry.rebuild(&[project("PROJ050", "Gone Next Time")]);
        assert_eq!(registry.code_for("Gone Next Time"), Some("PROJ050"));

        registry.rebuild(&[]);
        assert_eq!(registry.code_for("Gone Next Time"), None);
        assert_eq!(registry.len(), SEED_PROJECT_TABLE.len());
    }
}
