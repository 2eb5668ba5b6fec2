//! Preconditions checked before touching a profile.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::error::SyncError;
use crate::scm::VersionControl;

/// Process names containing one of these belong to the browser
const BROWSER_PROCESS_PATTERNS: &[&str] = &["zen-bin", "zen-browser", "zen-twilight", "zen.exe"];

/// Process names that must match exactly (too short for substring matching)
const BROWSER_PROCESS_EXACT: &[&str] = &["zen"];

/// Source of the names of running processes
pub trait ProcessProbe {
    fn process_names(&self) -> Result<Vec<String>>;
}

/// Reads the process table through `ps` (or `tasklist` on Windows)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl ProcessProbe for SystemProcesses {
    fn process_names(&self) -> Result<Vec<String>> {
        let output = if cfg!(target_os = "windows") {
            Command::new("tasklist").args(["/FO", "CSV", "/NH"]).output()
        } else {
            Command::new("ps").args(["-A", "-o", "comm="]).output()
        }
        .context("Failed to list running processes")?;

        if !output.status.success() {
            return Err(anyhow!(
                "Process listing failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| {
                // tasklist CSV puts the image name in the first quoted column
                line.trim()
                    .trim_start_matches('"')
                    .split('"')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
            .filter(|name| !name.is_empty())
            .collect())
    }
}

/// First process name that looks like the browser, if any.
///
/// This is a name heuristic, so unrelated processes whose names contain one
/// of the patterns are reported too.
pub fn find_browser_process(names: &[String]) -> Option<String> {
    names
        .iter()
        .find(|name| {
            let base = Path::new(name.as_str())
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_else(|| name.to_lowercase());
            BROWSER_PROCESS_EXACT.contains(&base.as_str())
                || BROWSER_PROCESS_PATTERNS.iter().any(|p| base.contains(p))
        })
        .cloned()
}

/// Refuse to continue while the browser may be writing to its profile.
///
/// An unreadable process table only produces a warning.
pub fn ensure_browser_not_running(probe: &dyn ProcessProbe) -> Result<()> {
    let names = match probe.process_names() {
        Ok(names) => names,
        Err(e) => {
            log::warn!("Could not check whether Zen is running: {e:#}");
            return Ok(());
        }
    };

    match find_browser_process(&names) {
        Some(process) => Err(SyncError::BrowserRunning(process).into()),
        None => Ok(()),
    }
}

/// Make sure the version control tool is installed
pub fn check_prerequisites(vcs: &dyn VersionControl) -> Result<()> {
    if vcs.is_available() {
        return Ok(());
    }

    let hint = if cfg!(target_os = "macos") {
        "Install it with 'xcode-select --install' or 'brew install git'"
    } else if cfg!(target_os = "windows") {
        "Install it from https://git-scm.com/download/win or with 'winget install Git.Git'"
    } else {
        "Install it with your package manager, e.g. 'sudo apt install git' or 'sudo dnf install git'"
    };

    Err(SyncError::PrerequisiteMissing {
        tool: vcs.tool_name().to_string(),
        hint: hint.to_string(),
    }
    .into())
}
