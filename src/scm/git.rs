//! Git SCM backend using CLI commands.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Scm, VersionControl};
use crate::error::SyncError;

/// Commit identity used when the user has none configured
const FALLBACK_USER_NAME: &str = "Zen Sync";
const FALLBACK_USER_EMAIL: &str = "zen-sync@local";

/// [`VersionControl`] backed by the `git` executable on PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl VersionControl for GitCli {
    fn tool_name(&self) -> &str {
        "git"
    }

    fn is_available(&self) -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn clone_repo(&self, url: &str, path: &Path) -> Result<Box<dyn Scm>> {
        Ok(Box::new(GitScm::clone(url, path)?))
    }

    fn init_repo(&self, path: &Path) -> Result<Box<dyn Scm>> {
        Ok(Box::new(GitScm::init(path)?))
    }
}

/// Git SCM implementation using the git CLI.
pub struct GitScm {
    workdir: PathBuf,
}

impl GitScm {
    /// Open an existing Git repository.
    pub fn open(path: &Path) -> Result<Self> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if !path.join(".git").exists() {
            return Err(anyhow!(
                "Not a git repository: '{}' (no .git directory)",
                path.display()
            ));
        }

        Ok(Self { workdir: path })
    }

    /// Initialize a new Git repository.
    pub fn init(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory '{}'", path.display()))?;

        let output = Command::new("git")
            .args(["init"])
            .current_dir(path)
            .output()
            .context("Failed to run 'git init'")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git init failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let scm = Self::open(path)?;
        scm.ensure_identity();
        Ok(scm)
    }

    /// Clone a remote repository.
    ///
    /// A failed clone is reported as [`SyncError::CloneFailed`] carrying git's
    /// stderr.
    pub fn clone(url: &str, path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory for '{}'", path.display())
            })?;
        }

        let output = Command::new("git")
            .args(["clone", url, &path.to_string_lossy()])
            .output()
            .context("Failed to run 'git clone'")?;

        if !output.status.success() {
            return Err(SyncError::CloneFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )
            .into());
        }

        let scm = Self::open(path)?;
        scm.ensure_identity();
        Ok(scm)
    }

    /// Set a repository-local commit identity if none is configured
    fn ensure_identity(&self) {
        if !self.git_succeeds(&["config", "user.email"]) {
            let _ = self.run_git(&["config", "user.email", FALLBACK_USER_EMAIL]);
        }
        if !self.git_succeeds(&["config", "user.name"]) {
            let _ = self.run_git(&["config", "user.name", FALLBACK_USER_NAME]);
        }
    }

    /// Run a git command and return stdout as a string.
    fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("Failed to run 'git {}'", args.join(" ")))?;

        if !output.status.success() {
            return Err(anyhow!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a git command, returning Ok if it succeeds (ignoring stdout).
    fn run_git_ok(&self, args: &[&str]) -> Result<()> {
        self.run_git(args)?;
        Ok(())
    }

    /// Check if a git command succeeds (exit code 0).
    fn git_succeeds(&self, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Scm for GitScm {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn current_branch(&self) -> Result<String> {
        self.run_git(&["branch", "--show-current"])
    }

    fn stage_all(&self) -> Result<()> {
        self.run_git_ok(&["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_git_ok(&["commit", "-m", message])
    }

    fn has_changes(&self) -> Result<bool> {
        let output = self.run_git(&["status", "--porcelain"])?;
        Ok(!output.is_empty())
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.run_git_ok(&["remote", "add", name, url])
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        let output = Command::new("git")
            .args(["push", remote, branch])
            .current_dir(&self.workdir)
            .output()
            .context("Failed to run 'git push'")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SyncError::PushRejected(stderr.trim().to_string()).into());
        }

        Ok(())
    }
}
