use std::fmt;

/// One entry of the fixed backup manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSpec {
    /// Copied byte for byte
    Plain(&'static str),
    /// SQLite database, snapshotted through the online backup API
    Sqlite(&'static str),
    /// Directory stored as `<name>.tar.gz`
    Directory(&'static str),
}

impl FileSpec {
    pub fn name(&self) -> &'static str {
        match self {
            FileSpec::Plain(name) | FileSpec::Sqlite(name) | FileSpec::Directory(name) => name,
        }
    }

    /// File name of the artifact stored in the repository
    pub fn artifact_name(&self) -> String {
        match self {
            FileSpec::Directory(name) => format!("{name}.tar.gz"),
            FileSpec::Plain(name) | FileSpec::Sqlite(name) => name.to_string(),
        }
    }
}

impl fmt::Display for FileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSpec::Directory(name) => write!(f, "{name}/"),
            FileSpec::Plain(name) | FileSpec::Sqlite(name) => write!(f, "{name}"),
        }
    }
}

/// Sidecar suffixes SQLite keeps next to a database in WAL mode
pub const SQLITE_SIDECARS: [&str; 2] = ["-wal", "-shm"];

/// Everything a backup carries: bookmarks and history, session state,
/// keyboard shortcuts, themes and custom chrome.
pub const MANIFEST: &[FileSpec] = &[
    FileSpec::Sqlite("places.sqlite"),
    FileSpec::Sqlite("favicons.sqlite"),
    FileSpec::Plain("sessionstore.jsonlz4"),
    FileSpec::Plain("zen-sessions.jsonlz4"),
    FileSpec::Plain("zen-keyboard-shortcuts.json"),
    FileSpec::Plain("zen-themes.json"),
    FileSpec::Plain("zen-themes.css"),
    FileSpec::Plain("containers.json"),
    FileSpec::Directory("chrome"),
    FileSpec::Directory("sessionstore-backups"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_artifact_names_are_unique() {
        let names: HashSet<_> = MANIFEST.iter().map(|s| s.artifact_name()).collect();
        assert_eq!(names.len(), MANIFEST.len());
    }

    #[test]
    fn test_directory_artifact_is_tarball() {
        assert_eq!(FileSpec::Directory("chrome").artifact_name(), "chrome.tar.gz");
        assert_eq!(FileSpec::Sqlite("places.sqlite").artifact_name(), "places.sqlite");
    }
}
