use std::path::{Path, PathBuf};

/// Operating system family used to pick profile locations.
///
/// [`Platform::current`] is the only place the real OS is consulted, so tests
/// can build a locator for any platform over a temporary home directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Directories that may hold `profiles.ini`, in priority order.
    pub fn ini_bases(self, home: &Path) -> Vec<PathBuf> {
        match self {
            Platform::Linux => vec![
                home.join(".config").join("zen"),
                home.join(".zen"),
                home.join(".var")
                    .join("app")
                    .join("app.zen_browser.zen")
                    .join(".zen"),
            ],
            Platform::MacOs => vec![home
                .join("Library")
                .join("Application Support")
                .join("zen")],
            Platform::Other => Vec::new(),
        }
    }

    /// Directory whose immediate subdirectories are Twilight profiles.
    pub fn twilight_dir(self, home: &Path) -> Option<PathBuf> {
        match self {
            Platform::Linux => Some(home.join(".zen-twilight")),
            Platform::MacOs => Some(
                home.join("Library")
                    .join("Application Support")
                    .join("zen-twilight")
                    .join("Profiles"),
            ),
            Platform::Other => None,
        }
    }

    /// Whether `IsRelative=` in `profiles.ini` is taken into account
    pub fn honors_is_relative(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}
