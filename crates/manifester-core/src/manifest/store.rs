// ── Manifest store ──
//
// Owns every file side effect of a reconciliation pass. All I/O is
// sequential and synchronous. In dry-run mode each mutating operation
// logs what it would do and reports the change without writing. The
// would-be results are staged in memory so later steps of the same pass
// see them.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{CoreError, ManifestError};
use crate::manifest::document::ManifestDocument;
use crate::manifest::{DEPARTMENT_TEMPLATE, INCLUDES_DIR, include_entry, template};

/// Result of [`ManifestStore::remove_stale_entries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sweep {
    pub removed: usize,
    pub failed: usize,
}

/// The Munki `manifests/` directory.
#[derive(Debug)]
pub struct ManifestStore {
    root: PathBuf,
    exclusions: BTreeSet<String>,
    dry_run: bool,
    staged: Mutex<Staged>,
}

/// Dry-run view of the directory: what a real pass would have changed.
#[derive(Debug, Default)]
struct Staged {
    removed: BTreeSet<String>,
    devices: BTreeMap<String, ManifestDocument>,
    departments: BTreeSet<String>,
}

impl ManifestStore {
    /// Open an existing manifest directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(CoreError::ManifestDirMissing { path: root }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::ManifestDirMissing { path: root });
            }
            Err(e) => return Err(ManifestError::io(root, e).into()),
        }

        Ok(Self {
            root,
            exclusions: BTreeSet::new(),
            dry_run: false,
            staged: Mutex::default(),
        })
    }

    /// File names (serials) the sweep never removes.
    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions
            .extend(exclusions.into_iter().map(Into::into));
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclusions.contains(name)
    }

    pub fn device_path(&self, serial: &str) -> PathBuf {
        self.root.join(serial)
    }

    pub fn department_path(&self, department: &str) -> PathBuf {
        self.root.join(INCLUDES_DIR).join(department)
    }

    pub fn department_template_path(&self) -> PathBuf {
        self.root.join(INCLUDES_DIR).join(DEPARTMENT_TEMPLATE)
    }

    fn staged(&self) -> MutexGuard<'_, Staged> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Enumeration ──────────────────────────────────────────────────

    /// Names directly under the manifest directory (files and directories).
    ///
    /// In dry-run mode the listing reflects the staged sweep and creations.
    pub fn list_current_entries(&self) -> Result<BTreeSet<String>, ManifestError> {
        let entries = fs::read_dir(&self.root).map_err(|e| ManifestError::io(&self.root, e))?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| ManifestError::io(&self.root, e))?;
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }

        if self.dry_run {
            let staged = self.staged();
            names.retain(|name| !staged.removed.contains(name));
            names.extend(staged.devices.keys().cloned());
        }
        Ok(names)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Delete every regular file directly under the directory that is not
    /// excluded. Directories (`includes/` among them) are left alone.
    ///
    /// Only failing to read the directory is an error; a file that cannot
    /// be removed is logged and counted. A dry-run sweep starts a fresh
    /// staging area.
    pub fn remove_stale_entries(&self) -> Result<Sweep, ManifestError> {
        let entries = fs::read_dir(&self.root).map_err(|e| ManifestError::io(&self.root, e))?;
        let mut sweep = Sweep::default();
        if self.dry_run {
            *self.staged() = Staged::default();
        }

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %self.root.display(), error = %e, "failed to read directory entry");
                    sweep.failed += 1;
                    continue;
                }
            };
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if self.is_excluded(&name) {
                debug!(path = %path.display(), "excluded; keeping");
                continue;
            }
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => {
                    debug!(path = %path.display(), "skipping directory");
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to stat entry");
                    sweep.failed += 1;
                    continue;
                }
            }

            if self.dry_run {
                info!(path = %path.display(), "would remove manifest");
                self.staged().removed.insert(name);
                sweep.removed += 1;
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed manifest");
                    sweep.removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove manifest");
                    sweep.failed += 1;
                }
            }
        }

        Ok(sweep)
    }

    /// Write the device template to `<dir>/<serial>` if no file exists.
    ///
    /// Returns whether a manifest was (or, in dry-run, would be) created.
    pub fn ensure_device_manifest(&self, serial: &str, username: &str) -> Result<bool, ManifestError> {
        validate_name(serial)?;
        let path = self.device_path(serial);

        if self.dry_run {
            let mut staged = self.staged();
            if staged.devices.contains_key(serial)
                || (path.exists() && !staged.removed.contains(serial))
            {
                return Ok(false);
            }
            info!(%serial, %username, path = %path.display(), "would create device manifest");
            staged
                .devices
                .insert(serial.to_owned(), template::device_manifest(username));
            return Ok(true);
        }

        let bytes = template::device_manifest(username)
            .to_xml()
            .map_err(|source| ManifestError::Plist {
                path: path.clone(),
                source,
            })?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(%serial, "device manifest exists");
                return Ok(false);
            }
            Err(e) => return Err(ManifestError::io(path, e)),
        };
        file.write_all(&bytes)
            .map_err(|e| ManifestError::io(&path, e))?;

        debug!(%serial, %username, path = %path.display(), "created device manifest");
        Ok(true)
    }

    /// Copy the department template to `includes/<department>` unless that
    /// file already exists. Existing department manifests are never read
    /// or rewritten.
    pub fn ensure_department_manifest(&self, department: &str) -> Result<bool, ManifestError> {
        validate_name(department)?;
        let path = self.department_path(department);

        match fs::metadata(&path) {
            Ok(_) => {
                debug!(%department, "department manifest exists");
                return Ok(false);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ManifestError::io(path, e)),
        }

        let template = self.department_template_path();
        if !template.is_file() {
            return Err(ManifestError::TemplateMissing { path: template });
        }

        if self.dry_run {
            if !self.staged().departments.insert(department.to_owned()) {
                return Ok(false);
            }
            info!(%department, path = %path.display(), "would create department manifest");
            return Ok(true);
        }
        fs::copy(&template, &path).map_err(|e| ManifestError::io(&path, e))?;
        debug!(%department, path = %path.display(), "created department manifest");
        Ok(true)
    }

    /// Add `includes/<department>` to the device manifest's
    /// `included_manifests`. Returns whether the document changed.
    pub fn link_department(&self, serial: &str, department: &str) -> Result<bool, ManifestError> {
        validate_name(serial)?;
        validate_name(department)?;
        let path = self.device_path(serial);

        if self.dry_run {
            return self.stage_link(serial, department, path);
        }

        let mut doc = ManifestDocument::read(&path)?;
        let changed = doc
            .include(&include_entry(department))
            .map_err(|source| ManifestError::Malformed {
                path: path.clone(),
                source,
            })?;
        if !changed {
            return Ok(false);
        }

        doc.write(&path)?;
        debug!(%serial, %department, "linked department");
        Ok(true)
    }

    /// Dry-run link against the staged document, reading it from disk on
    /// first use. A manifest the sweep staged for removal is gone.
    fn stage_link(
        &self,
        serial: &str,
        department: &str,
        path: PathBuf,
    ) -> Result<bool, ManifestError> {
        let mut guard = self.staged();
        let staged = &mut *guard;

        let doc = match staged.devices.entry(serial.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if staged.removed.contains(serial) {
                    return Err(ManifestError::io(path, io::ErrorKind::NotFound.into()));
                }
                entry.insert(ManifestDocument::read(&path)?)
            }
        };

        let changed = doc
            .include(&include_entry(department))
            .map_err(|source| ManifestError::Malformed {
                path: path.clone(),
                source,
            })?;
        if changed {
            info!(%serial, %department, path = %path.display(), "would link department");
        }
        Ok(changed)
    }
}

/// A manifest name must be a single, ordinary path component.
fn validate_name(name: &str) -> Result<(), ManifestError> {
    let reason = if name.trim().is_empty() {
        "empty name"
    } else if name == "." || name == ".." {
        "relative path component"
    } else if name.contains(['/', '\\']) {
        "contains a path separator"
    } else if name.contains('\0') {
        "contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(ManifestError::InvalidName {
        name: name.to_owned(),
        reason,
    })
}
