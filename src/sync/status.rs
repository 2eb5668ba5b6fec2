use anyhow::Result;
use colored::Colorize;

use crate::profile::ProfileLocator;
use crate::reconcile::MANIFEST;

use super::state::ConfigStore;

/// List discovered profiles, one per line
pub fn list_profiles(locator: &ProfileLocator) -> Result<()> {
    let profiles = locator.discover()?;

    if profiles.is_empty() {
        println!("{}", "No Zen browser profiles found".yellow());
        return Ok(());
    }

    println!("{}", "Profiles:".bold());
    for (index, profile) in profiles.iter().enumerate() {
        println!("  {}. {}", index + 1, profile);
    }
    Ok(())
}

/// Status panel shown when no command is given
pub fn show_status(store: &ConfigStore, locator: &ProfileLocator) -> Result<()> {
    println!("{}", "=== Zen Sync Status ===".bold().cyan());
    println!();

    println!("{}", "Repository:".bold());
    match store.load()? {
        Some(config) => {
            println!("  URL: {}", config.repository_url.cyan());
            println!(
                "  Last backup: {}",
                config.last_backup.as_deref().unwrap_or("never")
            );
            println!(
                "  Last restore: {}",
                config.last_restore.as_deref().unwrap_or("never")
            );
        }
        None => println!("  {}", "Not configured".yellow()),
    }
    println!();

    match list_profiles(locator) {
        Ok(()) => {}
        Err(e) => println!("  {} {e:#}", "Could not list profiles:".yellow()),
    }
    println!();

    println!("{} {}", "Backed up items:".bold(), MANIFEST.len());
    for spec in MANIFEST {
        println!("  {}", spec.to_string().dimmed());
    }
    println!();

    println!("{}", "Usage:".bold());
    println!("  zen-sync backup          Back up a profile to the repository");
    println!("  zen-sync restore         Restore a profile from the repository");
    println!("  zen-sync repo            Show the configured repository");
    println!("  zen-sync repo set <url>  Configure the repository");
    println!("  zen-sync repo clear      Forget the repository");
    println!("  zen-sync profiles        List discovered profiles");

    Ok(())
}
