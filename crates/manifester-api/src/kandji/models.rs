// Kandji API response types.
//
// Only the fields manifester reads are modeled; unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of the `GET devices` array.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceRecord {
    pub device_id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub user: Option<DeviceUser>,
}

impl DeviceRecord {
    /// The assigned user record, if the device has one.
    pub fn assigned_user(&self) -> Option<&UserRecord> {
        self.user.as_ref().and_then(DeviceUser::assigned)
    }
}

/// Kandji reports an unassigned device's `user` as `""` and an assigned
/// one as an object, so the field is an untagged union.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DeviceUser {
    Assigned(UserRecord),
    Unassigned(String),
}

impl DeviceUser {
    pub fn assigned(&self) -> Option<&UserRecord> {
        match self {
            Self::Assigned(user) => Some(user),
            Self::Unassigned(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRecord {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub is_archived: bool,
}

/// User IDs are numeric on older tenants and strings on newer ones.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
