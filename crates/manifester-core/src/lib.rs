// manifester-core: Reconciliation engine between the MDM/directory clients and the Munki repo.

pub mod config;
pub mod convert;
pub mod directory;
pub mod error;
pub mod groups;
pub mod manifest;
pub mod model;
pub mod provider;
pub mod reconcile;
pub mod roster;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    DEFAULT_DETAIL_WORKERS, DirectoryConfig, MdmBackend, MdmConfig, MdmCredentials,
    ReconcileConfig, TlsVerification,
};
pub use directory::{GroupDirectory, OktaDirectory};
pub use error::{CoreError, DocumentError, ManifestError};
pub use groups::{DepartmentMembers, GroupFilter, GroupResolution, resolve_departments};
pub use manifest::{ManifestDocument, ManifestStore, Sweep};
pub use model::{AssignedUser, Device, Group, MachineInfo, MachineRecord};
pub use provider::{DeviceSource, MdmProvider};
pub use reconcile::{ReconcileReport, Reconciler};
pub use roster::{Roster, build_roster, username_from_email};
