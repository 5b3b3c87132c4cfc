// ── Munki manifest repository ──
//
// Layout under the manifest directory:
//   <dir>/<serial>                      device manifests (owned by manifester)
//   <dir>/includes/<department>         department manifests, created once
//   <dir>/includes/department_template  seed copied for new departments

pub mod document;
pub mod store;
pub mod template;

pub use document::ManifestDocument;
pub use store::{ManifestStore, Sweep};

/// Subdirectory holding shared and department manifests.
pub const INCLUDES_DIR: &str = "includes";

/// Seed file copied verbatim for each new department.
pub const DEPARTMENT_TEMPLATE: &str = "department_template";

/// `included_manifests` entry for a department.
pub fn include_entry(department: &str) -> String {
    format!("{INCLUDES_DIR}/{department}")
}
