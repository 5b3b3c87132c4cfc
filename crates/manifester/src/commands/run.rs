//! `manifester run`: one reconciliation pass.

use manifester_config::Config;
use manifester_core::{ReconcileReport, Reconciler};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn summary(report: &ReconcileReport) -> String {
    let mut lines = Vec::new();
    if report.dry_run {
        lines.push("Dry run: nothing was written".to_owned());
    }
    lines.extend([
        format!("Removed:             {}", report.removed),
        format!("Devices created:     {}", report.devices_created),
        format!("Departments created: {}", report.departments_created),
        format!("Links added:         {}", report.links_added),
        format!("Failures:            {}", report.failures),
    ]);
    lines.join("\n")
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    // Config problems on either side fail before anything is swept.
    let devices = super::mdm_provider(cfg)?;
    let directory = super::okta_directory(cfg)?;
    let reconcile = manifester_config::reconcile_config(cfg, global.dry_run);

    let reconciler = Reconciler::from_config(devices, directory, &reconcile)?;
    let report = reconciler.run().await?;

    if report.failures > 0 {
        tracing::warn!(failures = report.failures, "pass finished with per-item failures");
    }

    let out = output::render_single(&global.output, &report, summary)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
