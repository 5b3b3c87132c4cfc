//! Command dispatch: config -> core clients -> output formatting.

pub mod config_cmd;
pub mod departments;
pub mod devices;
pub mod run;

use manifester_config::Config;
use manifester_core::{MdmProvider, OktaDirectory};

use crate::error::CliError;

/// MDM provider for the configured backend.
fn mdm_provider(cfg: &Config) -> Result<MdmProvider, CliError> {
    let mdm = manifester_config::mdm_config(cfg)?;
    tracing::debug!(backend = %mdm.backend, url = %mdm.url, "connecting to MDM");
    Ok(MdmProvider::setup(&mdm)?)
}

fn okta_directory(cfg: &Config) -> Result<OktaDirectory, CliError> {
    let directory = manifester_config::directory_config(cfg)?;
    tracing::debug!(url = %directory.url, "connecting to directory");
    Ok(OktaDirectory::setup(&directory)?)
}
