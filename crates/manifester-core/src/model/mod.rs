// ── Domain model ──
//
// Backend-neutral records the reconciler works with. Kandji, Jamf and
// Okta payloads are normalized into these in `convert`.

pub mod device;
pub mod group;

pub use device::{AssignedUser, Device, MachineInfo, MachineRecord};
pub use group::Group;
