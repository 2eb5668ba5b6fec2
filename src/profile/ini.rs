//! Minimal `profiles.ini` reader.
//!
//! Only the keys needed to locate profiles are understood: `Name=`, `Path=`
//! and `IsRelative=`. Each `Name` is paired with the next `Path` that follows
//! it; sections are only used to reset `IsRelative` to its default.

use std::path::{Path, PathBuf};

/// A profile entry resolved against the directory holding `profiles.ini`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Parse `profiles.ini` content found in `base`.
///
/// With `honor_is_relative`, `IsRelative=0` keeps `Path` as an absolute path
/// and anything else prefixes `base`. Without it, `Path` is always joined to
/// `base`, which leaves an already-absolute path untouched.
pub fn parse_profiles_ini(content: &str, base: &Path, honor_is_relative: bool) -> Vec<IniEntry> {
    let mut entries = Vec::new();
    let mut pending_name: Option<String> = None;
    let mut is_relative = true;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with('[') {
            is_relative = true;
            continue;
        }

        if let Some(value) = line.strip_prefix("Name=") {
            pending_name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("IsRelative=") {
            is_relative = value.trim() != "0";
        } else if let Some(value) = line.strip_prefix("Path=") {
            let Some(name) = pending_name.take() else {
                continue;
            };
            let value = value.trim();
            let path = if honor_is_relative && !is_relative {
                PathBuf::from(value)
            } else {
                base.join(value)
            };
            entries.push(IniEntry { name, path });
        }
    }

    entries
}
