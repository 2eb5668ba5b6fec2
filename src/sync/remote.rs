use anyhow::{Context, Result};
use colored::Colorize;
use inquire::validator::Validation;
use inquire::{Confirm, Text};

use crate::config::ConfigManager;
use crate::error::SyncError;

use super::state::{is_valid_repository_url, ConfigStore, RepositoryConfig};

pub(super) fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Ask for a repository URL until a valid one is entered, then save it
pub fn configure_interactively(store: &ConfigStore) -> Result<RepositoryConfig> {
    let url = Text::new("Repository URL:")
        .with_placeholder("git@github.com:user/zen-backup.git")
        .with_help_message("https://...git or git@...git; the repository may be empty")
        .with_validator(|input: &str| {
            if is_valid_repository_url(input.trim()) {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    "URL must start with https:// or git@ and end with .git".into(),
                ))
            }
        })
        .prompt()
        .context("Failed to get repository URL")?;

    let config = store.save(&url, &ConfigManager::default_repo_dir()?)?;
    println!(
        "{} Repository set to: {}",
        "✓".green().bold(),
        config.repository_url.cyan()
    );
    Ok(config)
}

/// Load the repository record for a backup or restore.
///
/// When none exists and `interactive` is set, the operator is offered to
/// configure one; otherwise the run fails with
/// [`SyncError::RepositoryNotConfigured`].
pub(super) fn ensure_configured(
    store: &ConfigStore,
    interactive: bool,
) -> Result<RepositoryConfig> {
    if let Some(config) = store.load()? {
        return Ok(config);
    }

    if !interactive {
        return Err(SyncError::RepositoryNotConfigured.into());
    }

    let configure = Confirm::new("No backup repository configured. Set one now?")
        .with_default(true)
        .prompt()
        .context("Failed to get confirmation")?;

    if !configure {
        return Err(SyncError::RepositoryNotConfigured.into());
    }

    configure_interactively(store)
}

/// `zen-sync repo`
pub fn show_repository(store: &ConfigStore) -> Result<()> {
    println!("{}", "=== Backup Repository ===".bold().cyan());
    println!();

    match store.load()? {
        Some(config) => {
            println!("{} {}", "URL:".bold(), config.repository_url.cyan());
            println!(
                "{} {}",
                "Scratch directory:".bold(),
                config.repository_dir.display()
            );
            println!(
                "{} {}",
                "Last backup:".bold(),
                config.last_backup.as_deref().unwrap_or("never")
            );
            println!(
                "{} {}",
                "Last restore:".bold(),
                config.last_restore.as_deref().unwrap_or("never")
            );
        }
        None => {
            println!("{}", "No repository configured".yellow());
            println!("\n{} zen-sync repo set <url>", "Hint:".cyan());
        }
    }

    Ok(())
}

/// `zen-sync repo set [url]`
///
/// Without a URL the operator is prompted (and re-prompted on invalid
/// input). A URL given on the command line is validated once.
pub fn set_repository(store: &ConfigStore, url: Option<&str>) -> Result<()> {
    let config = match url {
        Some(url) => {
            let config = store.save(url, &ConfigManager::default_repo_dir()?)?;
            println!(
                "{} Repository set to: {}",
                "✓".green().bold(),
                config.repository_url.cyan()
            );
            config
        }
        None => configure_interactively(store)?,
    };

    log::debug!(
        "Repository config written to {} (scratch dir {})",
        store.path().display(),
        config.repository_dir.display()
    );
    println!("\n{} zen-sync backup", "Next:".cyan());

    Ok(())
}

/// `zen-sync repo clear`
pub fn clear_repository(store: &ConfigStore) -> Result<()> {
    if store.clear()? {
        println!("{} Repository configuration removed", "✓".green().bold());
    } else {
        println!("{}", "No repository configured".dimmed());
    }
    Ok(())
}
