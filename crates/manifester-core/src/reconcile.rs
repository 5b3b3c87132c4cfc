// ── Reconciler ──
//
// One pass over the manifest repository:
//   1. sweep device manifests (keeping exclusions and directories)
//   2. build the roster from the MDM            (fatal on failure)
//   3. create manifests for devices with none
//   4. resolve department memberships           (degrades to none)
//   5. create missing department manifests
//   6. link each member's device to its departments
//
// Only steps 1-2 can fail the run. Everything after logs per-item
// failures and keeps going.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ReconcileConfig;
use crate::directory::GroupDirectory;
use crate::error::CoreError;
use crate::groups::{DepartmentMembers, GroupFilter, resolve_departments};
use crate::manifest::ManifestStore;
use crate::provider::DeviceSource;
use crate::roster::{Roster, build_roster, username_from_email};

/// What one pass changed (or, in dry-run, would change).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub removed: usize,
    pub devices_created: usize,
    pub departments_created: usize,
    pub links_added: usize,
    /// Per-item failures that were logged and skipped.
    pub failures: usize,
    pub dry_run: bool,
}

pub struct Reconciler<D, G> {
    devices: D,
    directory: G,
    store: ManifestStore,
    filter: GroupFilter,
}

impl<D: DeviceSource, G: GroupDirectory> Reconciler<D, G> {
    pub fn new(devices: D, directory: G, store: ManifestStore, filter: GroupFilter) -> Self {
        Self {
            devices,
            directory,
            store,
            filter,
        }
    }

    /// Open the manifest directory named by `config`; fails when it does
    /// not exist.
    pub fn from_config(devices: D, directory: G, config: &ReconcileConfig) -> Result<Self, CoreError> {
        let store = ManifestStore::open(&config.manifest_dir)?
            .with_exclusions(config.exclusions.iter().cloned())
            .with_dry_run(config.dry_run);
        let filter = GroupFilter::new(
            config.department_filter.clone(),
            config.excluded_groups.iter().cloned(),
        );
        Ok(Self::new(devices, directory, store, filter))
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    /// Run one full pass.
    pub async fn run(&self) -> Result<ReconcileReport, CoreError> {
        let mut report = ReconcileReport {
            dry_run: self.store.is_dry_run(),
            ..ReconcileReport::default()
        };

        let sweep = self.store.remove_stale_entries()?;
        report.removed = sweep.removed;
        report.failures += sweep.failed;
        info!(removed = sweep.removed, failed = sweep.failed, "swept device manifests");

        let roster = build_roster(&self.devices).await?;
        self.create_device_manifests(&roster, &mut report)?;

        let departments = match resolve_departments(&self.directory, &self.filter).await {
            Ok(resolution) => {
                report.failures += resolution.failed_groups.len();
                resolution.departments
            }
            Err(e) => {
                warn!(error = %e, "failed to list directory groups; continuing without departments");
                report.failures += 1;
                DepartmentMembers::new()
            }
        };

        self.create_department_manifests(&departments, &mut report);
        self.link_departments(&roster, &departments, &mut report);

        info!(
            removed = report.removed,
            devices_created = report.devices_created,
            departments_created = report.departments_created,
            links_added = report.links_added,
            failures = report.failures,
            dry_run = report.dry_run,
            "reconciliation complete"
        );
        Ok(report)
    }

    fn create_device_manifests(
        &self,
        roster: &Roster,
        report: &mut ReconcileReport,
    ) -> Result<(), CoreError> {
        let current = self.store.list_current_entries()?;

        for record in roster.records() {
            if current.contains(&record.serial) || self.store.is_excluded(&record.serial) {
                continue;
            }
            match self.store.ensure_device_manifest(&record.serial, &record.username) {
                Ok(true) => report.devices_created += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(serial = %record.serial, error = %e, "failed to create device manifest");
                    report.failures += 1;
                }
            }
        }
        Ok(())
    }

    fn create_department_manifests(
        &self,
        departments: &DepartmentMembers,
        report: &mut ReconcileReport,
    ) {
        for department in departments.keys() {
            match self.store.ensure_department_manifest(department) {
                Ok(true) => report.departments_created += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(%department, error = %e, "failed to create department manifest");
                    report.failures += 1;
                }
            }
        }
    }

    /// Every member's device gets every department it belongs to, whether
    /// or not the department manifest itself could be created. Excluded
    /// serials are linked too; exclusion only guards against the sweep.
    fn link_departments(
        &self,
        roster: &Roster,
        departments: &DepartmentMembers,
        report: &mut ReconcileReport,
    ) {
        for (department, emails) in departments {
            for email in emails {
                let username = username_from_email(email);
                let Some(serial) = roster.serial_for(username) else {
                    debug!(%department, %email, "member has no device");
                    continue;
                };

                match self.store.link_department(serial, department) {
                    Ok(true) => report.links_added += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(%serial, %department, error = %e, "failed to link department");
                        report.failures += 1;
                    }
                }
            }
        }
    }
}
