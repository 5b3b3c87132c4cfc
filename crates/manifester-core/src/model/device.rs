// ── Device domain types ──

use serde::Serialize;

/// One managed computer. The serial number is its identity and its
/// manifest file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub device_id: String,
    pub hostname: String,
    pub serial_number: String,
}

/// The user an MDM assigns to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedUser {
    pub email: String,
    pub name: String,
    pub id: String,
}

/// A device and its assigned user, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineInfo {
    pub device: Device,
    pub user: Option<AssignedUser>,
}

impl MachineInfo {
    pub fn serial(&self) -> &str {
        &self.device.serial_number
    }

    /// Local part of the assigned user's email; `""` when unassigned.
    pub fn username(&self) -> &str {
        self.user
            .as_ref()
            .map_or("", |user| crate::roster::username_from_email(&user.email))
    }
}

/// Serial + username pair the manifest store is driven by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineRecord {
    pub serial: String,
    /// Empty when the device has no assigned user.
    pub username: String,
}

impl From<&MachineInfo> for MachineRecord {
    fn from(machine: &MachineInfo) -> Self {
        Self {
            serial: machine.serial().to_owned(),
            username: machine.username().to_owned(),
        }
    }
}
