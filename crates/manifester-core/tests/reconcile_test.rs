#![allow(clippy::unwrap_used)]
// End-to-end reconciliation passes against fake MDM and directory sources.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use manifester_core::{
    AssignedUser, CoreError, Device, DeviceSource, Group, GroupDirectory, MachineInfo,
    ManifestDocument, ReconcileConfig, ReconcileReport, Reconciler,
};

// ── Fakes ───────────────────────────────────────────────────────────

struct FakeMdm {
    machines: Vec<MachineInfo>,
    fail: bool,
}

impl DeviceSource for FakeMdm {
    async fn list_all_devices(&self) -> Result<Vec<MachineInfo>, CoreError> {
        if self.fail {
            return Err(CoreError::AuthenticationFailed {
                message: "token revoked".into(),
            });
        }
        Ok(self.machines.clone())
    }
}

#[derive(Default)]
struct FakeDirectory {
    groups: Vec<Group>,
    members: HashMap<String, Vec<String>>,
    broken_groups: Vec<String>,
    fail_listing: bool,
}

impl FakeDirectory {
    fn group(mut self, id: &str, name: &str, emails: &[&str]) -> Self {
        self.groups.push(Group {
            id: id.into(),
            name: name.into(),
            description: None,
        });
        self.members
            .insert(id.into(), emails.iter().map(ToString::to_string).collect());
        self
    }
}

impl GroupDirectory for FakeDirectory {
    async fn list_groups(&self) -> Result<Vec<Group>, CoreError> {
        if self.fail_listing {
            return Err(CoreError::ConnectionFailed {
                url: "https://acme.okta.com".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(self.groups.clone())
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<String>, CoreError> {
        if self.broken_groups.iter().any(|g| g == group_id) {
            return Err(CoreError::Api {
                message: "internal error".into(),
                status: Some(500),
            });
        }
        Ok(self.members.get(group_id).cloned().unwrap_or_default())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

const DEPARTMENT_SEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>managed_installs</key>
	<array/>
</dict>
</plist>
"#;

/// A device manifest an admin maintains by hand.
const HAND_MANAGED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>catalogs</key>
	<array>
		<string>testing</string>
	</array>
	<key>included_manifests</key>
	<array>
		<string>includes/common_base</string>
	</array>
</dict>
</plist>
"#;

fn machine(serial: &str, email: Option<&str>) -> MachineInfo {
    MachineInfo {
        device: Device {
            device_id: format!("id-{serial}"),
            hostname: format!("{serial}-mbp"),
            serial_number: serial.into(),
        },
        user: email.map(|email| AssignedUser {
            email: email.into(),
            name: String::new(),
            id: String::new(),
        }),
    }
}

fn fleet() -> FakeMdm {
    FakeMdm {
        machines: vec![
            machine("SERIAL123", None),
            machine("SERIAL124", Some("jdoe@example.com")),
            machine("SERIAL125", Some("sam@example.com")),
            machine("KEEP1", Some("kim@example.com")),
        ],
        fail: false,
    }
}

fn directory() -> FakeDirectory {
    FakeDirectory::default()
        .group("00g1", "Engineering", &["jdoe@example.com", "kim@example.com"])
        .group("00g2", "Eng-Platform", &["jdoe@example.com", "sam@example.com"])
        .group("00g3", "Sales", &["sam@example.com"])
        .group("00g4", "Eng-Interns", &[])
}

/// A manifest directory with `includes/` seeded the way a Munki admin
/// sets it up, one stale device manifest and one excluded manifest.
fn seed_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let includes = dir.path().join("includes");
    fs::create_dir(&includes).unwrap();
    fs::write(includes.join("department_template"), DEPARTMENT_SEED).unwrap();
    for shared in ["apple_apps", "common_base", "optional_apps", "security"] {
        fs::write(includes.join(shared), DEPARTMENT_SEED).unwrap();
    }
    fs::write(dir.path().join("RETIRED01"), "stale").unwrap();
    fs::write(dir.path().join("KEEP1"), HAND_MANAGED).unwrap();
    dir
}

fn config(dir: &Path) -> ReconcileConfig {
    ReconcileConfig {
        manifest_dir: dir.to_path_buf(),
        exclusions: vec!["KEEP1".into()],
        department_filter: "Eng".into(),
        excluded_groups: Vec::new(),
        dry_run: false,
    }
}

fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn includes_of(dir: &Path, serial: &str) -> Vec<String> {
    ManifestDocument::read(&dir.join(serial))
        .unwrap()
        .included_manifests()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

// ── Full pass ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_pass_converges_repository() {
    let dir = seed_repo();
    let reconciler = Reconciler::from_config(fleet(), directory(), &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(
        report,
        ReconcileReport {
            removed: 1,
            devices_created: 3,
            departments_created: 2,
            links_added: 4,
            failures: 0,
            dry_run: false,
        }
    );

    assert!(!dir.path().join("RETIRED01").exists());
    assert_eq!(
        includes_of(dir.path(), "KEEP1"),
        vec!["includes/common_base", "includes/Engineering"]
    );
    let keep = ManifestDocument::read(&dir.path().join("KEEP1")).unwrap();
    assert_eq!(keep.catalogs(), vec!["testing"]);

    assert_eq!(
        includes_of(dir.path(), "SERIAL124"),
        vec![
            "includes/apple_apps",
            "includes/common_base",
            "includes/optional_apps",
            "includes/security",
            "includes/Eng-Platform",
            "includes/Engineering",
        ]
    );
    assert_eq!(
        includes_of(dir.path(), "SERIAL125"),
        vec![
            "includes/apple_apps",
            "includes/common_base",
            "includes/optional_apps",
            "includes/security",
            "includes/Eng-Platform",
        ]
    );
    assert_eq!(
        includes_of(dir.path(), "SERIAL123"),
        vec![
            "includes/apple_apps",
            "includes/common_base",
            "includes/optional_apps",
        ]
    );

    let includes = dir.path().join("includes");
    assert_eq!(
        fs::read_to_string(includes.join("Engineering")).unwrap(),
        DEPARTMENT_SEED
    );
    assert!(includes.join("Eng-Platform").is_file());
    assert!(!includes.join("Sales").exists(), "filtered out by prefix");
    assert!(!includes.join("Eng-Interns").exists(), "no members");
}

#[tokio::test]
async fn test_second_pass_is_byte_identical() {
    let dir = seed_repo();
    let reconciler = Reconciler::from_config(fleet(), directory(), &config(dir.path())).unwrap();

    reconciler.run().await.unwrap();
    let first = snapshot(dir.path());

    let report = reconciler.run().await.unwrap();
    let second = snapshot(dir.path());

    assert_eq!(first, second);
    assert_eq!(report.departments_created, 0);
    assert_eq!(report.failures, 0);
}

#[tokio::test]
async fn test_department_manifests_are_never_rewritten() {
    let dir = seed_repo();
    let reconciler = Reconciler::from_config(fleet(), directory(), &config(dir.path())).unwrap();
    reconciler.run().await.unwrap();

    let engineering = dir.path().join("includes/Engineering");
    fs::write(&engineering, "customized by an admin").unwrap();
    reconciler.run().await.unwrap();

    assert_eq!(
        fs::read_to_string(&engineering).unwrap(),
        "customized by an admin"
    );
}

#[tokio::test]
async fn test_unassigned_devices_all_get_manifests() {
    let dir = seed_repo();
    let mdm = FakeMdm {
        machines: vec![machine("LOANER1", None), machine("LOANER2", None)],
        fail: false,
    };
    let reconciler =
        Reconciler::from_config(mdm, FakeDirectory::default(), &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.devices_created, 2);
    assert!(dir.path().join("LOANER1").is_file());
    assert!(dir.path().join("LOANER2").is_file());
}

#[tokio::test]
async fn test_excluded_groups_are_ignored() {
    let dir = seed_repo();
    let mut cfg = config(dir.path());
    cfg.excluded_groups = vec!["Eng-Platform".into()];
    let reconciler = Reconciler::from_config(fleet(), directory(), &cfg).unwrap();

    reconciler.run().await.unwrap();

    assert!(!dir.path().join("includes/Eng-Platform").exists());
    assert!(!includes_of(dir.path(), "SERIAL125").contains(&"includes/Eng-Platform".to_string()));
}

// ── Failure handling ────────────────────────────────────────────────

#[tokio::test]
async fn test_member_failure_skips_only_that_group() {
    let dir = seed_repo();
    let mut dir_source = directory();
    dir_source.broken_groups = vec!["00g2".into()];
    let reconciler = Reconciler::from_config(fleet(), dir_source, &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.failures, 1);
    assert!(dir.path().join("includes/Engineering").is_file());
    assert!(!dir.path().join("includes/Eng-Platform").exists());
    assert!(includes_of(dir.path(), "SERIAL124").contains(&"includes/Engineering".to_string()));
}

#[tokio::test]
async fn test_directory_outage_still_builds_device_manifests() {
    let dir = seed_repo();
    let dir_source = FakeDirectory {
        fail_listing: true,
        ..directory()
    };
    let reconciler = Reconciler::from_config(fleet(), dir_source, &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.devices_created, 3);
    assert_eq!(report.departments_created, 0);
    assert_eq!(report.failures, 1);
    assert!(dir.path().join("SERIAL124").is_file());
}

#[tokio::test]
async fn test_roster_failure_fails_the_run() {
    let dir = seed_repo();
    let mdm = FakeMdm {
        machines: Vec::new(),
        fail: true,
    };
    let reconciler = Reconciler::from_config(mdm, directory(), &config(dir.path())).unwrap();

    let err = reconciler.run().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert!(!dir.path().join("SERIAL124").exists());
}

#[tokio::test]
async fn test_invalid_serial_fails_only_that_device() {
    let dir = seed_repo();
    let mut mdm = fleet();
    mdm.machines.push(machine("C02/BAD", Some("sam@example.com")));
    let reconciler = Reconciler::from_config(mdm, directory(), &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    // One failed create, one failed link (sam now maps to the bad serial).
    assert_eq!(report.failures, 2);
    assert_eq!(report.devices_created, 3);
    assert_eq!(report.links_added, 3);
    assert!(includes_of(dir.path(), "SERIAL124").contains(&"includes/Engineering".to_string()));
}

#[tokio::test]
async fn test_excluded_manifest_is_kept_and_still_linked() {
    let dir = seed_repo();
    let mut cfg = config(dir.path());
    cfg.exclusions.push("SERIAL124".into());
    fs::write(dir.path().join("SERIAL124"), HAND_MANAGED).unwrap();
    let reconciler = Reconciler::from_config(fleet(), directory(), &cfg).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.failures, 0);
    assert_eq!(report.devices_created, 2);
    let doc = ManifestDocument::read(&dir.path().join("SERIAL124")).unwrap();
    assert_eq!(doc.display_name(), None, "not regenerated from the template");
    assert_eq!(doc.catalogs(), vec!["testing"]);
    assert_eq!(
        doc.included_manifests(),
        vec!["includes/common_base", "includes/Eng-Platform", "includes/Engineering"]
    );
}

#[tokio::test]
async fn test_unreadable_excluded_manifest_fails_only_its_links() {
    let dir = seed_repo();
    let mut cfg = config(dir.path());
    cfg.exclusions.push("SERIAL124".into());
    fs::write(dir.path().join("SERIAL124"), "not a plist").unwrap();
    let reconciler = Reconciler::from_config(fleet(), directory(), &cfg).unwrap();

    let report = reconciler.run().await.unwrap();

    // jdoe belongs to two departments; both links fail.
    assert_eq!(report.failures, 2);
    assert_eq!(report.links_added, 2);
    assert_eq!(fs::read_to_string(dir.path().join("SERIAL124")).unwrap(), "not a plist");
    assert!(includes_of(dir.path(), "SERIAL125").contains(&"includes/Eng-Platform".to_string()));
}

#[tokio::test]
async fn test_missing_department_template_still_links_members() {
    let dir = seed_repo();
    fs::remove_file(dir.path().join("includes/department_template")).unwrap();
    let reconciler = Reconciler::from_config(fleet(), directory(), &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.departments_created, 0);
    assert_eq!(report.failures, 2);
    assert_eq!(report.links_added, 4);
    assert!(!dir.path().join("includes/Engineering").exists());
    assert!(includes_of(dir.path(), "SERIAL124").contains(&"includes/Engineering".to_string()));
}

#[tokio::test]
async fn test_member_without_email_links_the_unassigned_device() {
    let dir = seed_repo();
    let dir_source = directory().group("00g5", "Eng-Loaners", &[""]);
    let reconciler = Reconciler::from_config(fleet(), dir_source, &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(report.links_added, 5);
    assert_eq!(report.departments_created, 3);
    assert_eq!(
        includes_of(dir.path(), "SERIAL123").last().map(String::as_str),
        Some("includes/Eng-Loaners")
    );
}

#[tokio::test]
async fn test_department_with_path_separator_is_rejected() {
    let dir = seed_repo();
    let dir_source = FakeDirectory::default()
        .group("00g1", "Eng/../../etc", &["jdoe@example.com"])
        .group("00g2", "Engineering", &["jdoe@example.com"]);
    let reconciler = Reconciler::from_config(fleet(), dir_source, &config(dir.path())).unwrap();

    let report = reconciler.run().await.unwrap();

    // Both the department manifest and the link are refused.
    assert_eq!(report.failures, 2);
    assert_eq!(report.links_added, 1);
    assert_eq!(
        includes_of(dir.path(), "SERIAL124").last().map(String::as_str),
        Some("includes/Engineering")
    );
}

#[test]
fn test_missing_manifest_dir_is_fatal() {
    let dir = TempDir::new().unwrap();
    let cfg = ReconcileConfig {
        manifest_dir: dir.path().join("munki_repo/manifests"),
        ..ReconcileConfig::default()
    };
    let result = Reconciler::from_config(fleet(), directory(), &cfg);
    assert!(matches!(result, Err(CoreError::ManifestDirMissing { .. })));
}

// ── Dry run ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_dry_run_reports_without_writing() {
    let dir = seed_repo();
    let before = snapshot(dir.path());
    let mut cfg = config(dir.path());
    cfg.dry_run = true;
    let reconciler = Reconciler::from_config(fleet(), directory(), &cfg).unwrap();

    let report = reconciler.run().await.unwrap();

    assert_eq!(snapshot(dir.path()), before);
    assert!(report.dry_run);
    assert_eq!(report.removed, 1);
    assert_eq!(report.devices_created, 3);
    assert_eq!(report.departments_created, 2);
    assert_eq!(report.links_added, 4);
    assert_eq!(report.failures, 0);
}

#[tokio::test]
async fn test_dry_run_on_converged_repository_matches_real_pass() {
    let dir = seed_repo();
    let real = Reconciler::from_config(fleet(), directory(), &config(dir.path())).unwrap();
    real.run().await.unwrap();
    let converged = snapshot(dir.path());

    let mut cfg = config(dir.path());
    cfg.dry_run = true;
    let dry = Reconciler::from_config(fleet(), directory(), &cfg).unwrap();
    let predicted = dry.run().await.unwrap();
    assert_eq!(snapshot(dir.path()), converged);

    let actual = real.run().await.unwrap();

    // Every device manifest is swept and regenerated, then relinked.
    assert_eq!(
        actual,
        ReconcileReport {
            removed: 3,
            devices_created: 3,
            departments_created: 0,
            links_added: 3,
            failures: 0,
            dry_run: false,
        }
    );
    assert_eq!(
        predicted,
        ReconcileReport {
            dry_run: true,
            ..actual
        }
    );
}
