use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use zen_sync::profile::ProfileLocator;
use zen_sync::sync::{self, ConfigStore, SyncOptions};

#[derive(Parser)]
#[command(name = "zen-sync")]
#[command(about = "Back up and restore Zen browser profiles with a git repository", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a profile to the repository
    Backup {
        /// Profile name to back up (skips the selection prompt)
        #[arg(short, long)]
        profile: Option<String>,

        /// Commit message (optional)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Restore a profile from the repository
    Restore {
        /// Profile name to restore into (skips the selection prompt)
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Show or change the backup repository
    Repo {
        #[command(subcommand)]
        action: Option<RepoAction>,
    },

    /// List discovered browser profiles
    Profiles,
}

#[derive(Subcommand)]
enum RepoAction {
    /// Set the repository URL (prompts when omitted)
    Set {
        /// https://...git or git@...git
        url: Option<String>,
    },

    /// Forget the configured repository
    Clear,
}

fn run(cli: Cli) -> Result<i32> {
    zen_sync::logger::init_logger(cli.verbose)?;

    match cli.command {
        None => {
            sync::show_status(&ConfigStore::open_default()?, &ProfileLocator::system()?)?;
            return Ok(1);
        }
        Some(Commands::Backup { profile, message }) => {
            sync::backup_profile(&SyncOptions { profile, message })?;
        }
        Some(Commands::Restore { profile }) => {
            sync::restore_profile(&SyncOptions {
                profile,
                message: None,
            })?;
        }
        Some(Commands::Repo { action }) => {
            let store = ConfigStore::open_default()?;
            match action {
                None => sync::show_repository(&store)?,
                Some(RepoAction::Set { url }) => sync::set_repository(&store, url.as_deref())?,
                Some(RepoAction::Clear) => sync::clear_repository(&store)?,
            }
        }
        Some(Commands::Profiles) => {
            sync::list_profiles(&ProfileLocator::system()?)?;
        }
    }

    Ok(0)
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("{e:?}");
            let _ = zen_sync::logger::log_to_file(&format!("error: {e:#}"));
            eprintln!("{} {e:#}", "Error:".red().bold());
            1
        }
    };

    std::process::exit(code);
}
