//! Browser profile discovery and selection.
//!
//! Regular profiles are listed in a `profiles.ini` file under one of the
//! platform's base directories; Twilight profiles are plain subdirectories of
//! a fixed directory. Both sources are always consulted and their results are
//! concatenated in discovery order.

mod ini;
mod platform;

use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::SyncError;

pub use ini::{parse_profiles_ini, IniEntry};
pub use platform::Platform;

/// Which release channel a profile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Regular,
    Twilight,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Regular => write!(f, "regular"),
            ProfileKind::Twilight => write!(f, "twilight"),
        }
    }
}

/// A discovered profile directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDescriptor {
    pub name: String,
    pub path: PathBuf,
    pub kind: ProfileKind,
}

impl fmt::Display for ProfileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] → {}", self.name, self.kind, self.path.display())
    }
}

/// One place profiles can be found
pub trait ProfileSource {
    fn discover(&self) -> Result<Vec<ProfileDescriptor>>;
}

/// Profiles listed in the first `profiles.ini` found among `bases`
pub struct IniProfileSource {
    pub bases: Vec<PathBuf>,
    pub honor_is_relative: bool,
}

impl ProfileSource for IniProfileSource {
    fn discover(&self) -> Result<Vec<ProfileDescriptor>> {
        let Some(base) = self
            .bases
            .iter()
            .find(|base| base.join("profiles.ini").is_file())
        else {
            log::debug!("No profiles.ini found in any known location");
            return Ok(Vec::new());
        };

        let ini_path = base.join("profiles.ini");
        log::debug!("Reading profiles from {}", ini_path.display());
        let content = fs::read_to_string(&ini_path)
            .with_context(|| format!("Failed to read {}", ini_path.display()))?;

        Ok(parse_profiles_ini(&content, base, self.honor_is_relative)
            .into_iter()
            .map(|entry| ProfileDescriptor {
                name: entry.name,
                path: entry.path,
                kind: ProfileKind::Regular,
            })
            .collect())
    }
}

/// Every immediate subdirectory of `dir` is a Twilight profile
pub struct TwilightProfileSource {
    pub dir: PathBuf,
}

impl ProfileSource for TwilightProfileSource {
    fn discover(&self) -> Result<Vec<ProfileDescriptor>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut profiles = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?;

        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            profiles.push(ProfileDescriptor {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
                kind: ProfileKind::Twilight,
            });
        }

        Ok(profiles)
    }
}

/// Finds profiles for a platform relative to a home directory
pub struct ProfileLocator {
    platform: Platform,
    home: PathBuf,
}

impl ProfileLocator {
    pub fn new(platform: Platform, home: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            home: home.into(),
        }
    }

    /// Locator for the running system and the current user's home
    pub fn system() -> Result<Self> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(Self::new(Platform::current(), home))
    }

    fn sources(&self) -> Vec<Box<dyn ProfileSource>> {
        let mut sources: Vec<Box<dyn ProfileSource>> = vec![Box::new(IniProfileSource {
            bases: self.platform.ini_bases(&self.home),
            honor_is_relative: self.platform.honors_is_relative(),
        })];

        if let Some(dir) = self.platform.twilight_dir(&self.home) {
            sources.push(Box::new(TwilightProfileSource { dir }));
        }

        sources
    }

    /// All profiles, regular ones first, in discovery order
    pub fn discover(&self) -> Result<Vec<ProfileDescriptor>> {
        let mut profiles = Vec::new();
        for source in self.sources() {
            profiles.extend(source.discover()?);
        }
        Ok(profiles)
    }
}

/// Pick one profile, asking the operator when there is more than one.
///
/// The prompt repeats until a valid 1-based index is entered. End of input is
/// reported as [`SyncError::SelectionAborted`].
pub fn select_one<R: BufRead, W: Write>(
    profiles: Vec<ProfileDescriptor>,
    input: &mut R,
    output: &mut W,
) -> Result<ProfileDescriptor> {
    match profiles.len() {
        0 => Err(SyncError::NoProfilesFound.into()),
        1 => {
            let profile = profiles.into_iter().next().ok_or(SyncError::NoProfilesFound)?;
            writeln!(output, "  {} {}", "Using profile:".green(), profile)?;
            Ok(profile)
        }
        count => {
            writeln!(output, "{}", "Multiple profiles found:".bold())?;
            for (index, profile) in profiles.iter().enumerate() {
                writeln!(output, "  {}. {}", index + 1, profile)?;
            }

            loop {
                write!(output, "Select a profile [1-{count}]: ")?;
                output.flush()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    return Err(SyncError::SelectionAborted.into());
                }

                match line.trim().parse::<usize>() {
                    Ok(choice) if (1..=count).contains(&choice) => {
                        let profile = profiles
                            .into_iter()
                            .nth(choice - 1)
                            .ok_or(SyncError::NoProfilesFound)?;
                        writeln!(output, "  {} {}", "Using profile:".green(), profile)?;
                        return Ok(profile);
                    }
                    _ => writeln!(
                        output,
                        "  {} enter a number between 1 and {count}",
                        "Invalid choice:".yellow()
                    )?,
                }
            }
        }
    }
}

/// Pick the profile whose name matches `name` exactly
pub fn select_by_name(profiles: Vec<ProfileDescriptor>, name: &str) -> Result<ProfileDescriptor> {
    if profiles.is_empty() {
        return Err(SyncError::NoProfilesFound.into());
    }
    profiles
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| SyncError::ProfileNotFound(name.to_string()).into())
}
