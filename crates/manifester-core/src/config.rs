// ── Runtime configuration ──
//
// These types describe *what* to reconcile and *how* to reach the MDM and
// the directory. They carry credential data and tuning but never touch
// disk: manifester-config builds them and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use manifester_api::{TlsMode, TransportConfig};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

/// Concurrent Jamf detail lookups unless configured otherwise.
pub const DEFAULT_DETAIL_WORKERS: usize = manifester_api::jamf::DEFAULT_DETAIL_WORKERS;

/// Which MDM backend supplies the device roster.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MdmBackend {
    #[default]
    Kandji,
    Jamf,
}

/// How to authenticate with the MDM.
#[derive(Debug, Clone)]
pub enum MdmCredentials {
    /// API token (Kandji).
    Token(SecretString),
    /// API account (Jamf Classic API).
    Basic {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-hosted Jamf with a self-signed cert).
    DangerAcceptInvalid,
}

impl TlsVerification {
    pub(crate) fn transport(&self, timeout: Duration) -> TransportConfig {
        let tls = match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig { tls, timeout }
    }
}

/// Connection settings for the MDM backend.
#[derive(Debug, Clone)]
pub struct MdmConfig {
    pub backend: MdmBackend,
    /// Tenant/server root; API path suffixes are added by the clients.
    pub url: Url,
    pub credentials: MdmCredentials,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Jamf only: concurrent per-computer detail lookups.
    pub detail_workers: usize,
}

/// Connection settings for the Okta directory.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub url: Url,
    pub token: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

/// What one reconciliation pass operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Munki `manifests/` directory.
    pub manifest_dir: PathBuf,
    /// Serial numbers (file names) the pass never deletes or touches.
    pub exclusions: Vec<String>,
    /// Group display-name prefix; empty keeps every group.
    pub department_filter: String,
    /// Group names (or ids) never treated as departments.
    pub excluded_groups: Vec<String>,
    /// Log intended changes without writing.
    pub dry_run: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from("munki_repo/manifests"),
            exclusions: Vec::new(),
            department_filter: String::new(),
            excluded_groups: Vec::new(),
            dry_run: false,
        }
    }
}
