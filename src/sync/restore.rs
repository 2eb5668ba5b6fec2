use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::logger;
use crate::reconcile::ReconcileReport;

use super::backup::print_report;
use super::workspace::Workspace;
use super::{prepare, SyncContext, SyncOptions};

/// Restore the selected profile from the configured repository.
///
/// Files already in the profile are kept as `<name>.bak`. There is no
/// rollback: an error part way through leaves earlier items restored. The
/// restore timestamp is only recorded when at least one item was restored.
pub fn run_restore<R: BufRead, W: Write>(
    ctx: &SyncContext,
    options: &SyncOptions,
    input: &mut R,
    output: &mut W,
) -> Result<ReconcileReport> {
    let (config, profile) = prepare(ctx, options, input, output)?;

    writeln!(output, "  {} {}...", "Cloning".cyan(), config.repository_url)?;
    let workspace = Workspace::materialize(
        ctx.vcs.as_ref(),
        &config.repository_url,
        &config.repository_dir,
    )?;

    writeln!(output, "  {} profile files...", "Restoring".cyan())?;
    let report = ctx
        .reconciler()
        .restore_all(workspace.dir(), &profile.path)?;
    print_report(output, &report)?;
    drop(workspace);

    if report.any_changed() {
        ctx.store
            .record_restore()
            .context("Restore finished but the timestamp could not be saved")?;
    } else {
        writeln!(
            output,
            "  {} The repository does not contain a backup yet",
            "Note:".yellow()
        )?;
    }

    Ok(report)
}

/// `zen-sync restore`
pub fn restore_profile(options: &SyncOptions) -> Result<()> {
    println!("{}", "Restoring Zen profile...".cyan().bold());

    let ctx = SyncContext::system()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let report = run_restore(&ctx, options, &mut input, &mut output)?;
    let _ = logger::log_to_file(&format!(
        "restore finished: {} item(s) restored",
        report.changed_count()
    ));

    if report.any_changed() {
        println!(
            "\n{} {} item(s) restored, previous files kept as *.bak",
            "Restore complete!".green().bold(),
            report.changed_count()
        );
    } else {
        println!("\n{}", "Nothing to restore.".yellow().bold());
    }

    Ok(())
}
