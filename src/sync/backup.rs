use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::logger;
use crate::reconcile::{ItemOutcome, ReconcileReport};

use super::workspace::Workspace;
use super::{prepare, SyncContext, SyncOptions};

/// How a backup run ended
#[derive(Debug)]
pub enum BackupOutcome {
    /// The profile had none of the manifest entries; nothing was committed
    NothingToBackup,
    /// Files were copied but matched what the remote already had
    Unchanged(ReconcileReport),
    /// A new commit was pushed
    Pushed(ReconcileReport),
}

fn outcome_label(outcome: ItemOutcome) -> colored::ColoredString {
    match outcome {
        ItemOutcome::Copied => "copied".green(),
        ItemOutcome::Snapshotted => "snapshot".green(),
        ItemOutcome::Archived => "archived".green(),
        ItemOutcome::Extracted => "extracted".green(),
        ItemOutcome::Missing => "not found".dimmed(),
    }
}

pub(super) fn print_report<W: Write>(output: &mut W, report: &ReconcileReport) -> Result<()> {
    for (spec, outcome) in &report.items {
        writeln!(output, "    {:<12} {}", outcome_label(*outcome), spec)?;
    }
    Ok(())
}

/// Back up the selected profile to the configured repository
pub fn run_backup<R: BufRead, W: Write>(
    ctx: &SyncContext,
    options: &SyncOptions,
    input: &mut R,
    output: &mut W,
) -> Result<BackupOutcome> {
    let (config, profile) = prepare(ctx, options, input, output)?;

    writeln!(output, "  {} {}...", "Cloning".cyan(), config.repository_url)?;
    let workspace = Workspace::materialize(
        ctx.vcs.as_ref(),
        &config.repository_url,
        &config.repository_dir,
    )?;

    writeln!(output, "  {} profile files...", "Copying".cyan())?;
    let report = ctx
        .reconciler()
        .backup_all(&profile.path, workspace.dir())?;
    print_report(output, &report)?;

    if !report.any_changed() {
        writeln!(
            output,
            "  {} No files found to back up in {}",
            "Note:".yellow(),
            profile.path.display()
        )?;
        return Ok(BackupOutcome::NothingToBackup);
    }

    let default_message = format!(
        "Backup of {} at {}",
        profile.name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let message = options.message.as_deref().unwrap_or(&default_message);

    writeln!(output, "  {} changes...", "Pushing".cyan())?;
    let pushed = workspace.commit_and_push(message)?;
    drop(workspace);

    ctx.store
        .record_backup()
        .context("Backup pushed but the timestamp could not be saved")?;

    if pushed {
        writeln!(output, "  {} Committed: {}", "✓".green(), message)?;
        Ok(BackupOutcome::Pushed(report))
    } else {
        writeln!(
            output,
            "  {} Remote already matches this profile",
            "Note:".yellow()
        )?;
        Ok(BackupOutcome::Unchanged(report))
    }
}

/// `zen-sync backup`
pub fn backup_profile(options: &SyncOptions) -> Result<()> {
    println!("{}", "Backing up Zen profile...".cyan().bold());

    let ctx = SyncContext::system()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let outcome = run_backup(&ctx, options, &mut input, &mut output)?;
    let _ = logger::log_to_file(&format!("backup finished: {outcome:?}"));

    match outcome {
        BackupOutcome::NothingToBackup => {
            println!("\n{}", "Nothing to back up.".yellow().bold());
        }
        BackupOutcome::Unchanged(report) | BackupOutcome::Pushed(report) => {
            println!(
                "\n{} {} item(s) backed up",
                "Backup complete!".green().bold(),
                report.changed_count()
            );
        }
    }

    Ok(())
}
