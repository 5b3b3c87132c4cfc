//! `manifester departments`: resolved department memberships.

use manifester_config::Config;
use manifester_core::{GroupFilter, resolve_departments};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Department {
    name: String,
    members: Vec<String>,
}

#[derive(Tabled)]
struct DepartmentRow {
    #[tabled(rename = "Department")]
    name: String,
    #[tabled(rename = "Members")]
    count: usize,
    #[tabled(rename = "Emails")]
    emails: String,
}

fn row(d: &Department) -> DepartmentRow {
    DepartmentRow {
        name: d.name.clone(),
        count: d.members.len(),
        emails: d.members.join(", "),
    }
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let directory = super::okta_directory(cfg)?;
    let filter = GroupFilter::new(
        cfg.reconcile.department_filter.clone(),
        cfg.reconcile.excluded_groups.iter().cloned(),
    );

    let resolution = resolve_departments(&directory, &filter).await?;
    for group in &resolution.failed_groups {
        tracing::warn!(department = %group, "members could not be listed");
    }

    let departments: Vec<Department> = resolution
        .departments
        .into_iter()
        .map(|(name, members)| Department {
            name,
            members: members.into_iter().collect(),
        })
        .collect();

    let out = output::render_list(&global.output, &departments, row, |d| {
        d.name.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
