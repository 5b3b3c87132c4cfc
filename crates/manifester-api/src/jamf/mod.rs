// Jamf Pro Classic API client modules
//
// The Classic API (`/JSSResource`) lists computers without user details,
// so a full inventory is one list call plus one detail call per computer.

pub mod client;
pub mod computers;
pub mod models;

pub use client::JamfClient;
pub use computers::DEFAULT_DETAIL_WORKERS;
