//! `manifester devices`: the MDM roster as the reconciler sees it.

use manifester_config::Config;
use manifester_core::{DeviceSource, MachineInfo};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
}

fn row(m: &MachineInfo) -> DeviceRow {
    DeviceRow {
        serial: m.serial().to_owned(),
        hostname: m.device.hostname.clone(),
        username: m.username().to_owned(),
        email: m.user.as_ref().map(|u| u.email.clone()).unwrap_or_default(),
    }
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let provider = super::mdm_provider(cfg)?;
    let mut machines = provider.list_all_devices().await?;
    machines.sort_by(|a, b| a.serial().cmp(b.serial()));
    tracing::info!(backend = %provider.backend(), count = machines.len(), "listed roster");

    let out = output::render_list(&global.output, &machines, row, |m| {
        m.serial().to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
