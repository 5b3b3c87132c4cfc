// ── API-to-domain type conversions ──
//
// Bridges raw `manifester_api` response types into `manifester_core::model`.
// An assigned user without an email is treated as unassigned so both MDM
// backends agree on what "no user" means.

use manifester_api::jamf::models::ComputerDetails;
use manifester_api::kandji::models::DeviceRecord;
use manifester_api::okta::models::Group as OktaGroup;

use crate::model::{AssignedUser, Device, Group, MachineInfo};

// ── Kandji ─────────────────────────────────────────────────────────

impl From<DeviceRecord> for MachineInfo {
    fn from(record: DeviceRecord) -> Self {
        let user = record
            .assigned_user()
            .filter(|user| !user.email.is_empty())
            .map(|user| AssignedUser {
                email: user.email.clone(),
                name: user.name.clone(),
                id: user.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            });

        MachineInfo {
            device: Device {
                device_id: record.device_id,
                hostname: record.device_name.unwrap_or_default(),
                serial_number: record.serial_number.unwrap_or_default(),
            },
            user,
        }
    }
}

// ── Jamf ───────────────────────────────────────────────────────────

impl From<ComputerDetails> for MachineInfo {
    fn from(details: ComputerDetails) -> Self {
        let location = details.location;
        let user = if location.email_address.is_empty() {
            None
        } else {
            Some(AssignedUser {
                name: location.display_name().to_owned(),
                id: location.username,
                email: location.email_address,
            })
        };

        MachineInfo {
            device: Device {
                device_id: details.general.id.to_string(),
                hostname: details.general.name,
                serial_number: details.general.serial_number,
            },
            user,
        }
    }
}

// ── Okta ───────────────────────────────────────────────────────────

impl From<OktaGroup> for Group {
    fn from(group: OktaGroup) -> Self {
        Group {
            id: group.id,
            name: group.profile.name,
            description: group.profile.description,
        }
    }
}
