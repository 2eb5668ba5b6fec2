//! # zen-sync
//!
//! A command-line tool for backing up and restoring Zen browser profiles with a Git repository.
//!
//! ## Overview
//!
//! `zen-sync` copies the parts of a browser profile that are painful to lose (bookmarks and
//! history database, session state, keyboard shortcuts, themes and `chrome/` customizations)
//! into a Git repository you own, and restores them on another machine or after a reinstall.
//! Every run clones the repository into a scratch directory, moves the files, pushes, and
//! deletes the scratch directory again, so nothing but the small JSON config persists locally.
//!
//! ## Key Features
//!
//! - **Profile discovery**: Finds regular profiles through `profiles.ini` and Twilight profiles
//!   by directory, on Linux (including Flatpak) and macOS
//! - **Consistent database copies**: SQLite files are snapshotted with the online backup API,
//!   falling back to copying the database and its WAL sidecars
//! - **Safe restore**: Anything a restore would overwrite is kept as `<name>.bak`
//! - **Empty remotes**: A repository that does not exist yet is initialized and seeded
//!
//! ## Architecture
//!
//! - Paths, logging and errors ([`config`], [`logger`], [`error`])
//! - Profile discovery and selection ([`profile`])
//! - Moving files between a profile and a checkout ([`reconcile`])
//! - Git plumbing ([`scm`])
//! - Safety checks before a run ([`guard`])
//! - Backup/restore orchestration and the persisted repository record ([`sync`])

/// Platform-agnostic configuration directory management.
///
/// Locates the config directory following platform conventions (XDG on Linux,
/// Application Support on macOS, AppData on Windows) and the files inside it.
pub mod config;

/// Fatal error conditions, downcastable from `anyhow::Error`.
pub mod error;

/// Prerequisite and browser-running checks.
pub mod guard;

/// Logging configuration and utilities.
///
/// Console logging through `env_logger` (configurable via `RUST_LOG`) plus an
/// append-only log file in the config directory with size-based rotation.
pub mod logger;

/// Profile discovery across platforms and `profiles.ini` formats, and
/// interactive selection of a single profile.
pub mod profile;

/// The fixed backup manifest and the logic that copies, snapshots and
/// archives it in both directions.
pub mod reconcile;

/// Version control abstraction with a `git` CLI implementation.
pub mod scm;

/// Backup and restore orchestration.
///
/// - **Backup**: clone, copy the manifest from the profile, commit, push
/// - **Restore**: clone, copy the manifest into the profile with `.bak` safety renames
///
/// Also holds the persisted repository record and the `repo` subcommands.
pub mod sync;
