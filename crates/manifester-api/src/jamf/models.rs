// Jamf Classic API response types (JSON representation).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ComputersResponse {
    #[serde(default)]
    pub computers: Vec<ComputerSummary>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComputerSummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComputerDetailsResponse {
    pub computer: ComputerDetails,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComputerDetails {
    pub general: ComputerGeneral,
    #[serde(default)]
    pub location: ComputerLocation,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComputerGeneral {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub udid: String,
}

/// The "User and Location" inventory section. Jamf sends empty strings
/// rather than omitting fields for computers with no assigned user.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComputerLocation {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub realname: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub department: String,
}

impl ComputerLocation {
    /// Display name, whichever of the two spellings Jamf populated.
    pub fn display_name(&self) -> &str {
        if self.real_name.is_empty() {
            &self.realname
        } else {
            &self.real_name
        }
    }
}
