// manifester-api: Async Rust clients for the MDM and directory APIs (Kandji, Jamf, Okta)

pub mod error;
pub mod jamf;
pub mod kandji;
pub mod link;
pub mod okta;
pub mod query;
pub mod transport;

pub use error::Error;
pub use jamf::JamfClient;
pub use kandji::KandjiClient;
pub use okta::OktaClient;
pub use query::QueryParams;
pub use transport::{TlsMode, TransportConfig};
