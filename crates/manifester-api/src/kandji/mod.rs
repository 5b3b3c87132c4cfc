// Kandji API client modules
//
// Hand-written client for the Kandji `api/v1` REST surface. Only the device
// inventory endpoints are covered; everything is bearer-token authenticated.

pub mod client;
pub mod devices;
pub mod models;

pub use client::KandjiClient;
pub use devices::{DEFAULT_PAGE_LIMIT, DeviceListParams};
