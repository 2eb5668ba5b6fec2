//! SCM (Source Control Management) abstraction layer.
//!
//! [`VersionControl`] creates working copies (clone or init) and [`Scm`]
//! operates on one of them. The git implementation shells out to the `git`
//! CLI; tests substitute in-memory fakes.

mod git;

use anyhow::Result;
use std::path::Path;

pub use git::{GitCli, GitScm};

/// Operations on a single working copy.
pub trait Scm {
    /// Root of the working copy.
    fn workdir(&self) -> &Path;

    /// Get the current branch name (works on an unborn branch too).
    fn current_branch(&self) -> Result<String>;

    /// Stage all changes (add and remove).
    fn stage_all(&self) -> Result<()>;

    /// Commit staged changes with a message.
    fn commit(&self, message: &str) -> Result<()>;

    /// Check if there are uncommitted changes, staged or not.
    fn has_changes(&self) -> Result<bool>;

    /// Add a remote repository.
    fn add_remote(&self, name: &str, url: &str) -> Result<()>;

    /// Push a branch to a remote.
    ///
    /// A non-zero exit is reported as [`crate::error::SyncError::PushRejected`].
    fn push(&self, remote: &str, branch: &str) -> Result<()>;
}

/// Factory for working copies backed by a particular tool.
pub trait VersionControl {
    /// Name of the binary this backend needs, for prerequisite messages.
    fn tool_name(&self) -> &str;

    /// Whether the backing tool can be executed.
    fn is_available(&self) -> bool;

    /// Clone `url` into `path`.
    fn clone_repo(&self, url: &str, path: &Path) -> Result<Box<dyn Scm>>;

    /// Initialize an empty repository at `path`.
    fn init_repo(&self, path: &Path) -> Result<Box<dyn Scm>>;
}
