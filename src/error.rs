//! Error taxonomy for backup and restore runs.
//!
//! Fatal conditions are represented by [`SyncError`] and travel inside
//! `anyhow::Error`, so callers can add context with `?` and tests can
//! `downcast_ref::<SyncError>()` to check which condition fired.

use thiserror::Error;

/// Fatal conditions that abort a run with exit status 1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A required external tool is not installed
    #[error("Required tool '{tool}' was not found on PATH.\n{hint}")]
    PrerequisiteMissing { tool: String, hint: String },

    /// Repository URL does not look like `https://....git` or `git@....git`
    #[error(
        "Invalid repository URL: {0}\n\
        \n\
        URL must start with https:// or git@ and end with .git, e.g.:\n\
        - https://github.com/user/zen-backup.git\n\
        - git@github.com:user/zen-backup.git"
    )]
    InvalidUrl(String),

    /// No browser profile was discovered on this machine
    #[error("No Zen browser profiles found on this machine")]
    NoProfilesFound,

    /// `--profile` did not match any discovered profile
    #[error("No profile named '{0}' was found")]
    ProfileNotFound(String),

    /// The browser is running and may be writing to its profile
    #[error("Zen browser appears to be running ({0}). Close it and try again.")]
    BrowserRunning(String),

    /// Neither cloning nor initializing the scratch repository worked
    #[error("Failed to clone repository: {0}")]
    CloneFailed(String),

    /// `git push` exited non-zero
    #[error(
        "Push rejected: {0}\n\n\
        Possible causes:\n\
        1. Authentication failed - ensure credentials are configured\n\
        2. No permission to push to this repository\n\
        3. Network connectivity issues\n\
        4. Remote branch protection rules"
    )]
    PushRejected(String),

    /// `repo set` has never been run
    #[error("No repository configured. Run 'zen-sync repo set <url>' first.")]
    RepositoryNotConfigured,

    /// Profile selection prompt hit end of input
    #[error("Profile selection aborted")]
    SelectionAborted,
}
