//! Project code resolution for dependent rows
//!
//! Every Safety/Issue/Plan/Document/Permit/S-Curve row must end up with a
//! definitive project code. Resolution is an ordered chain of strategies,
//! each returning `Option<String>`, with the first hit short-circuiting:
//!
//! 1. the row's own explicit code field
//! 2. registry lookup by the row's project name
//! 3. case-insensitive scan of the current projects collection
//! 4. the [`UNRESOLVED_CODE`] sentinel
//!
//! Explicit codes beat derived ones, and registry state beats the O(n)
//! fallback scan. The scan covers rows whose project was committed in the
//! same upload but under a name the registry absorbed with different
//! casing or padding.

use crate::registry::IdentifierRegistry;
use sitedash_common::rows::{ProjectRecord, SheetRow};

/// Sentinel code marking a row whose project could not be resolved.
/// Rows carrying it are purged at the end of ingestion.
pub const UNRESOLVED_CODE: &str = "PROJ_UNKNOWN";

/// Resolves an arbitrary input row to an owning project code
///
/// Borrows the registry and the current projects collection for the
/// duration of one ingestion pass; holds no state of its own.
pub struct RowResolver<'a> {
    registry: &'a IdentifierRegistry,
    projects: &'a [ProjectRecord],
}

impl<'a> RowResolver<'a> {
    pub fn new(registry: &'a IdentifierRegistry, projects: &'a [ProjectRecord]) -> Self {
        Self { registry, projects }
    }

    /// Assign a definitive project code to `row`
    pub fn resolve(&self, row: &SheetRow) -> String {
        self.explicit_code(row)
            .or_else(|| self.registry_match(row))
            .or_else(|| self.project_scan(row))
            .unwrap_or_else(|| UNRESOLVED_CODE.to_string())
    }

    /// Strategy 1: the row already carries a code
    fn explicit_code(&self, row: &SheetRow) -> Option<String> {
        row.opt_field_str(sitedash_common::rows::fields::PROJECT_ID)
    }

    /// Strategy 2: registry lookup by project name
    fn registry_match(&self, row: &SheetRow) -> Option<String> {
        self.registry
            .code_for(&row.project_name())
            .map(str::to_string)
    }

    /// Strategy 3: linear scan of the projects collection, trimmed and
    /// case-insensitive
    fn project_scan(&self, row: &SheetRow) -> Option<String> {
        let name = row.project_name();
        if name.is_empty() {
            return None;
        }
        let wanted = name.to_lowercase();
        self.projects
            .iter()
            .find(|p| p.name.trim().to_lowercase() == wanted)
            .map(|p| p.code.clone())
    }
}
