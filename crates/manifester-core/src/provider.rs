// ── MDM provider seam ──
//
// `DeviceSource` is what the roster builder and reconciler depend on;
// `MdmProvider` is the production implementation dispatching to the
// configured backend. Test code supplies its own sources.

use std::future::Future;

use manifester_api::{JamfClient, KandjiClient};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::config::{MdmBackend, MdmConfig, MdmCredentials};
use crate::error::CoreError;
use crate::model::MachineInfo;

/// Anything that can produce the full device inventory.
pub trait DeviceSource: Send + Sync {
    /// Every device, fully materialized. A failed page fails the call.
    fn list_all_devices(&self) -> impl Future<Output = Result<Vec<MachineInfo>, CoreError>> + Send;
}

/// The configured MDM backend.
pub enum MdmProvider {
    Kandji(KandjiClient),
    Jamf {
        client: JamfClient,
        detail_workers: usize,
    },
}

impl MdmProvider {
    /// Build the client for `config.backend` from its credentials.
    pub fn setup(config: &MdmConfig) -> Result<Self, CoreError> {
        let transport = config.tls.transport(config.timeout);

        match (config.backend, &config.credentials) {
            (MdmBackend::Kandji, MdmCredentials::Token(token)) => {
                let client = KandjiClient::new(config.url.as_str(), token, &transport)?;
                debug!(url = %client.base_url(), "kandji provider ready");
                Ok(Self::Kandji(client))
            }
            (MdmBackend::Jamf, MdmCredentials::Basic { username, password }) => {
                let client = JamfClient::new(config.url.as_str(), username, password, &transport)?;
                debug!(url = %client.base_url(), workers = config.detail_workers, "jamf provider ready");
                Ok(Self::Jamf {
                    client,
                    detail_workers: config.detail_workers,
                })
            }
            (MdmBackend::Kandji, MdmCredentials::Basic { .. }) => Err(CoreError::Config {
                message: "kandji requires an API token, not a username/password".into(),
            }),
            (MdmBackend::Jamf, MdmCredentials::Token(token)) => {
                // A Jamf "token" here is almost always a misplaced password.
                let hint = if token.expose_secret().contains(':') {
                    " (use mdm.username and mdm.password instead of user:pass)"
                } else {
                    ""
                };
                Err(CoreError::Config {
                    message: format!("jamf requires a username and password{hint}"),
                })
            }
        }
    }

    pub fn backend(&self) -> MdmBackend {
        match self {
            Self::Kandji(_) => MdmBackend::Kandji,
            Self::Jamf { .. } => MdmBackend::Jamf,
        }
    }
}

impl DeviceSource for MdmProvider {
    async fn list_all_devices(&self) -> Result<Vec<MachineInfo>, CoreError> {
        let machines: Vec<MachineInfo> = match self {
            Self::Kandji(client) => client
                .list_all_devices()
                .await?
                .into_iter()
                .map(MachineInfo::from)
                .collect(),
            Self::Jamf {
                client,
                detail_workers,
            } => {
                let mut details = client.list_computer_details(*detail_workers).await?;
                // Detail lookups complete in arbitrary order.
                details.sort_by_key(|d| d.general.id);
                details.into_iter().map(MachineInfo::from).collect()
            }
        };

        Ok(with_serials(machines, self.backend()))
    }
}

/// Drop records that cannot name a manifest file.
fn with_serials(machines: Vec<MachineInfo>, backend: MdmBackend) -> Vec<MachineInfo> {
    machines
        .into_iter()
        .filter(|machine| {
            let keep = !machine.serial().trim().is_empty();
            if !keep {
                warn!(
                    %backend,
                    device_id = %machine.device.device_id,
                    hostname = %machine.device.hostname,
                    "skipping device without a serial number"
                );
            }
            keep
        })
        .collect()
}
