//! Moves the manifest between a profile directory and a repository checkout.
//!
//! Backups copy, snapshot or archive each [`FileSpec`] into the checkout.
//! Restores do the inverse, first renaming anything they would overwrite to
//! `<name>.bak`. Only one `.bak` generation is kept. A missing source is never
//! an error: the item is reported as [`ItemOutcome::Missing`] and skipped.

mod archive;
mod manifest;
mod snapshot;

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub use archive::{Archiver, TarGzArchiver};
pub use manifest::{FileSpec, MANIFEST, SQLITE_SIDECARS};
pub use snapshot::{DatabaseSnapshotter, SqliteSnapshotter};

/// What happened to one manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Plain byte copy (also used for the SQLite fallback path)
    Copied,
    /// Consistent database snapshot
    Snapshotted,
    /// Directory packed into a tarball
    Archived,
    /// Tarball unpacked into the profile
    Extracted,
    /// Source was absent; nothing was done
    Missing,
}

impl ItemOutcome {
    pub fn changed(self) -> bool {
        self != ItemOutcome::Missing
    }
}

/// Per-item outcomes of a whole backup or restore pass
#[derive(Debug, Default, Clone)]
pub struct ReconcileReport {
    pub items: Vec<(FileSpec, ItemOutcome)>,
}

impl ReconcileReport {
    pub fn any_changed(&self) -> bool {
        self.items.iter().any(|(_, outcome)| outcome.changed())
    }

    pub fn changed_count(&self) -> usize {
        self.items.iter().filter(|(_, o)| o.changed()).count()
    }

    pub fn missing(&self) -> impl Iterator<Item = &FileSpec> {
        self.items
            .iter()
            .filter(|(_, o)| !o.changed())
            .map(|(spec, _)| spec)
    }
}

/// `path` with `.bak` appended to its file name
pub fn bak_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// `path` with a SQLite sidecar suffix appended
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_any(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.with_context(|| format!("Failed to remove {}", path.display()))
}

/// Move an existing file or directory out of the way as `<path>.bak`.
///
/// Returns whether anything was moved.
fn preserve_existing(path: &Path) -> Result<bool> {
    if fs::symlink_metadata(path).is_err() {
        return Ok(false);
    }

    let bak = bak_path(path);
    if fs::symlink_metadata(&bak).is_ok() {
        remove_any(&bak)?;
    }

    fs::rename(path, &bak).with_context(|| {
        format!("Failed to rename {} to {}", path.display(), bak.display())
    })?;
    log::debug!("Preserved {} as {}", path.display(), bak.display());
    Ok(true)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

/// Copies the manifest in either direction using the given collaborators
pub struct Reconciler<'a> {
    archiver: &'a dyn Archiver,
    snapshotter: &'a dyn DatabaseSnapshotter,
}

impl<'a> Reconciler<'a> {
    pub fn new(archiver: &'a dyn Archiver, snapshotter: &'a dyn DatabaseSnapshotter) -> Self {
        Self {
            archiver,
            snapshotter,
        }
    }

    /// Copy one manifest entry from the profile into the checkout
    pub fn backup_one(
        &self,
        spec: FileSpec,
        profile_dir: &Path,
        scratch_dir: &Path,
    ) -> Result<ItemOutcome> {
        let source = profile_dir.join(spec.name());
        let dest = scratch_dir.join(spec.artifact_name());

        match spec {
            FileSpec::Plain(name) => {
                if !source.is_file() {
                    log::info!("{name} not found, skipping");
                    return Ok(ItemOutcome::Missing);
                }
                copy_file(&source, &dest)?;
                Ok(ItemOutcome::Copied)
            }
            FileSpec::Sqlite(name) => {
                if !source.is_file() {
                    log::info!("{name} not found, skipping");
                    return Ok(ItemOutcome::Missing);
                }

                // Sidecars from an earlier fallback copy must not be replayed
                // over a fresh snapshot on restore.
                for suffix in SQLITE_SIDECARS {
                    let stale = sidecar_path(&dest, suffix);
                    if stale.exists() {
                        remove_any(&stale)?;
                    }
                }

                match self.snapshotter.snapshot(&source, &dest) {
                    Ok(()) => Ok(ItemOutcome::Snapshotted),
                    Err(e) => {
                        log::warn!("Snapshot of {name} failed ({e:#}), copying raw files instead");
                        copy_file(&source, &dest)?;
                        for suffix in SQLITE_SIDECARS {
                            let sidecar = sidecar_path(&source, suffix);
                            if sidecar.is_file() {
                                copy_file(&sidecar, &sidecar_path(&dest, suffix))?;
                            }
                        }
                        Ok(ItemOutcome::Copied)
                    }
                }
            }
            FileSpec::Directory(name) => {
                if !source.is_dir() {
                    log::info!("{name}/ not found, skipping");
                    return Ok(ItemOutcome::Missing);
                }
                self.archiver.create(profile_dir, name, &dest)?;
                Ok(ItemOutcome::Archived)
            }
        }
    }

    /// Copy one manifest entry from the checkout back into the profile
    pub fn restore_one(
        &self,
        spec: FileSpec,
        scratch_dir: &Path,
        profile_dir: &Path,
    ) -> Result<ItemOutcome> {
        let artifact = scratch_dir.join(spec.artifact_name());
        let dest = profile_dir.join(spec.name());

        if !artifact.is_file() {
            log::info!("{} not found in backup, skipping", spec.artifact_name());
            return Ok(ItemOutcome::Missing);
        }

        match spec {
            FileSpec::Plain(_) => {
                preserve_existing(&dest)?;
                copy_file(&artifact, &dest)?;
                Ok(ItemOutcome::Copied)
            }
            FileSpec::Sqlite(_) => {
                preserve_existing(&dest)?;
                for suffix in SQLITE_SIDECARS {
                    preserve_existing(&sidecar_path(&dest, suffix))?;
                }

                copy_file(&artifact, &dest)?;
                for suffix in SQLITE_SIDECARS {
                    let sidecar = sidecar_path(&artifact, suffix);
                    if sidecar.is_file() {
                        copy_file(&sidecar, &sidecar_path(&dest, suffix))?;
                    }
                }
                Ok(ItemOutcome::Copied)
            }
            FileSpec::Directory(_) => {
                preserve_existing(&dest)?;
                self.archiver.extract(&artifact, profile_dir)?;
                Ok(ItemOutcome::Extracted)
            }
        }
    }

    /// Back up the whole manifest
    pub fn backup_all(&self, profile_dir: &Path, scratch_dir: &Path) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        for spec in MANIFEST {
            let outcome = self
                .backup_one(*spec, profile_dir, scratch_dir)
                .with_context(|| format!("Failed to back up {spec}"))?;
            report.items.push((*spec, outcome));
        }
        Ok(report)
    }

    /// Restore the whole manifest, creating the profile directory if needed
    pub fn restore_all(&self, scratch_dir: &Path, profile_dir: &Path) -> Result<ReconcileReport> {
        fs::create_dir_all(profile_dir)
            .with_context(|| format!("Failed to create {}", profile_dir.display()))?;

        let mut report = ReconcileReport::default();
        for spec in MANIFEST {
            let outcome = self
                .restore_one(*spec, scratch_dir, profile_dir)
                .with_context(|| format!("Failed to restore {spec}"))?;
            report.items.push((*spec, outcome));
        }
        Ok(report)
    }
}
