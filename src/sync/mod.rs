// Module declarations
mod backup;
mod remote;
mod restore;
mod state;
mod status;
mod workspace;

// Re-export public types and functions
pub use backup::{backup_profile, run_backup, BackupOutcome};
pub use remote::{clear_repository, configure_interactively, set_repository, show_repository};
pub use restore::{restore_profile, run_restore};
pub use state::{is_valid_repository_url, ConfigStore, RepositoryConfig};
pub use status::{list_profiles, show_status};
pub use workspace::{ScratchDir, Workspace};

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::guard::{self, ProcessProbe, SystemProcesses};
use crate::profile::{self, ProfileDescriptor, ProfileLocator};
use crate::reconcile::{
    Archiver, DatabaseSnapshotter, Reconciler, SqliteSnapshotter, TarGzArchiver,
};
use crate::scm::{GitCli, VersionControl};

/// Per-invocation choices from the command line
#[derive(Debug, Default, Clone)]
pub struct SyncOptions {
    /// Use the profile with this name instead of asking
    pub profile: Option<String>,
    /// Commit message for backups
    pub message: Option<String>,
}

/// Everything a backup or restore run talks to
pub struct SyncContext {
    pub store: ConfigStore,
    pub locator: ProfileLocator,
    pub vcs: Box<dyn VersionControl>,
    pub archiver: Box<dyn Archiver>,
    pub snapshotter: Box<dyn DatabaseSnapshotter>,
    pub processes: Box<dyn ProcessProbe>,
    /// Offer to configure a missing repository instead of failing
    pub interactive: bool,
}

impl SyncContext {
    /// Real collaborators for the current machine and user
    pub fn system() -> Result<Self> {
        Ok(Self {
            store: ConfigStore::open_default()?,
            locator: ProfileLocator::system()?,
            vcs: Box::new(GitCli),
            archiver: Box::new(TarGzArchiver),
            snapshotter: Box::new(SqliteSnapshotter),
            processes: Box::new(SystemProcesses),
            interactive: remote::is_interactive(),
        })
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(self.archiver.as_ref(), self.snapshotter.as_ref())
    }
}

/// Checks shared by backup and restore, ending with the chosen profile.
///
/// Tooling and the browser are checked before any prompt is shown.
fn prepare<R: BufRead, W: Write>(
    ctx: &SyncContext,
    options: &SyncOptions,
    input: &mut R,
    output: &mut W,
) -> Result<(RepositoryConfig, ProfileDescriptor)> {
    guard::check_prerequisites(ctx.vcs.as_ref())?;
    guard::ensure_browser_not_running(ctx.processes.as_ref())?;

    let config = remote::ensure_configured(&ctx.store, ctx.interactive)?;

    let profiles = ctx.locator.discover()?;
    log::debug!("Discovered {} profile(s)", profiles.len());

    let profile = match options.profile.as_deref() {
        Some(name) => {
            let chosen = profile::select_by_name(profiles, name)?;
            writeln!(output, "  Using profile: {chosen}")?;
            chosen
        }
        None => profile::select_one(profiles, input, output)?,
    };

    Ok((config, profile))
}
