use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::scm::{Scm, VersionControl};

/// Branch names tried when seeding an empty remote
const INITIAL_BRANCHES: [&str; 2] = ["main", "master"];

const PLACEHOLDER_README: &str = "# Zen browser profile backup\n\n\
    Managed by zen-sync. Do not edit by hand.\n";

fn remove_dir_if_present(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to remove {}", dir.display()))?;
    }
    Ok(())
}

/// Deletes its directory when dropped, on every exit path
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Wipe `path` and take ownership of it
    pub fn reset(path: &Path) -> Result<Self> {
        remove_dir_if_present(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = remove_dir_if_present(&self.path) {
            log::warn!("Failed to clean up scratch directory: {e:#}");
        } else {
            log::debug!("Removed scratch directory {}", self.path.display());
        }
    }
}

/// A throwaway checkout of the backup repository
pub struct Workspace {
    repo: Box<dyn Scm>,
    // Declared last so the checkout handle is dropped before the directory.
    scratch: ScratchDir,
}

impl Workspace {
    /// Clone `url` into a freshly wiped `scratch_dir`.
    ///
    /// When the clone fails (typically because the remote does not exist
    /// yet) an empty repository is created instead, seeded with a placeholder
    /// commit and pushed as `main` or `master`. Failures of that seed push are
    /// ignored; the real push happens after the files are copied.
    pub fn materialize(vcs: &dyn VersionControl, url: &str, scratch_dir: &Path) -> Result<Self> {
        let scratch = ScratchDir::reset(scratch_dir)?;

        let clone_error = match vcs.clone_repo(url, scratch.path()) {
            Ok(repo) => {
                log::debug!("Cloned {url} into {}", scratch.path().display());
                return Ok(Self { repo, scratch });
            }
            Err(e) => e,
        };

        log::info!("Clone failed, starting a new repository: {clone_error:#}");
        let repo = Self::seed(vcs, url, scratch.path()).map_err(|init_error| {
            log::debug!("Initializing a new repository also failed: {init_error:#}");
            if matches!(
                clone_error.downcast_ref::<SyncError>(),
                Some(SyncError::CloneFailed(_))
            ) {
                clone_error
            } else {
                SyncError::CloneFailed(format!("{clone_error:#}")).into()
            }
        })?;

        Ok(Self { repo, scratch })
    }

    fn seed(vcs: &dyn VersionControl, url: &str, dir: &Path) -> Result<Box<dyn Scm>> {
        remove_dir_if_present(dir)?;
        let repo = vcs.init_repo(dir)?;

        fs::write(dir.join("README.md"), PLACEHOLDER_README)
            .context("Failed to write placeholder README")?;
        repo.stage_all()?;
        repo.commit("Initial commit")?;
        repo.add_remote("origin", url)?;

        for branch in INITIAL_BRANCHES {
            match repo.push("origin", branch) {
                Ok(()) => {
                    log::debug!("Seeded remote branch {branch}");
                    break;
                }
                Err(e) => log::debug!("Seed push of {branch} failed: {e:#}"),
            }
        }

        Ok(repo)
    }

    pub fn dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Stage everything, commit and push to `origin`.
    ///
    /// Returns `false` without committing when the staged tree matches the
    /// last commit. A failed push is [`SyncError::PushRejected`].
    pub fn commit_and_push(&self, message: &str) -> Result<bool> {
        self.repo.stage_all()?;

        if !self.repo.has_changes()? {
            return Ok(false);
        }

        self.repo.commit(message)?;

        let branch = self
            .repo
            .current_branch()
            .ok()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| INITIAL_BRANCHES[0].to_string());
        self.repo.push("origin", &branch)?;

        Ok(true)
    }
}
