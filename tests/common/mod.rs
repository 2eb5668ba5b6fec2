//! Shared fixtures: a fake remote and helpers for building profiles.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use walkdir::WalkDir;

use zen_sync::error::SyncError;
use zen_sync::guard::ProcessProbe;
use zen_sync::profile::{Platform, ProfileLocator};
use zen_sync::reconcile::{SqliteSnapshotter, TarGzArchiver};
use zen_sync::scm::{Scm, VersionControl};
use zen_sync::sync::{ConfigStore, SyncContext};

pub const TEST_URL: &str = "git@github.com:user/zen-backup.git";

/// What the fake remote has seen
#[derive(Debug, Default)]
pub struct RemoteLog {
    pub clones: usize,
    pub inits: usize,
    pub commits: Vec<String>,
    pub pushes: Vec<String>,
}

/// A "remote" that is just a directory; clone copies it, push copies back
#[derive(Clone)]
pub struct FakeRemote {
    pub store: PathBuf,
    pub log: Rc<RefCell<RemoteLog>>,
    pub reject_pushes: bool,
}

impl FakeRemote {
    /// Remote that already exists (possibly empty)
    pub fn existing(store: &Path) -> Self {
        fs::create_dir_all(store).unwrap();
        Self {
            store: store.to_path_buf(),
            log: Rc::default(),
            reject_pushes: false,
        }
    }

    /// Remote that does not exist, so every clone fails
    pub fn missing(store: &Path) -> Self {
        Self {
            store: store.to_path_buf(),
            log: Rc::default(),
            reject_pushes: false,
        }
    }
}

pub fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.unwrap();
        let dest = to.join(entry.path().strip_prefix(from).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).unwrap();
        } else {
            fs::copy(entry.path(), &dest).unwrap();
        }
    }
}

/// Relative path → contents for every file under `root`
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().strip_prefix(root).unwrap().to_path_buf(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

impl VersionControl for FakeRemote {
    fn tool_name(&self) -> &str {
        "fake-git"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn clone_repo(&self, _url: &str, path: &Path) -> Result<Box<dyn Scm>> {
        if !self.store.is_dir() {
            return Err(SyncError::CloneFailed("repository not found".to_string()).into());
        }
        copy_tree(&self.store, path);
        self.log.borrow_mut().clones += 1;
        Ok(Box::new(FakeCheckout {
            remote: self.clone(),
            workdir: path.to_path_buf(),
        }))
    }

    fn init_repo(&self, path: &Path) -> Result<Box<dyn Scm>> {
        fs::create_dir_all(path)?;
        self.log.borrow_mut().inits += 1;
        Ok(Box::new(FakeCheckout {
            remote: self.clone(),
            workdir: path.to_path_buf(),
        }))
    }
}

pub struct FakeCheckout {
    remote: FakeRemote,
    workdir: PathBuf,
}

impl Scm for FakeCheckout {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn current_branch(&self) -> Result<String> {
        Ok("main".to_string())
    }

    fn stage_all(&self) -> Result<()> {
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.remote.log.borrow_mut().commits.push(message.to_string());
        Ok(())
    }

    fn has_changes(&self) -> Result<bool> {
        Ok(snapshot_tree(&self.workdir) != snapshot_tree(&self.remote.store))
    }

    fn add_remote(&self, _name: &str, _url: &str) -> Result<()> {
        Ok(())
    }

    fn push(&self, _remote: &str, branch: &str) -> Result<()> {
        if self.remote.reject_pushes {
            return Err(SyncError::PushRejected("permission denied".to_string()).into());
        }
        if self.remote.store.exists() {
            fs::remove_dir_all(&self.remote.store)?;
        }
        copy_tree(&self.workdir, &self.remote.store);
        self.remote.log.borrow_mut().pushes.push(branch.to_string());
        Ok(())
    }
}

/// Process table with fixed contents
pub struct FixedProcesses(pub Vec<String>);

impl ProcessProbe for FixedProcesses {
    fn process_names(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Version control that is not installed
pub struct NoGit;

impl VersionControl for NoGit {
    fn tool_name(&self) -> &str {
        "git"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn clone_repo(&self, _url: &str, _path: &Path) -> Result<Box<dyn Scm>> {
        Err(anyhow!("git is not installed"))
    }

    fn init_repo(&self, _path: &Path) -> Result<Box<dyn Scm>> {
        Err(anyhow!("git is not installed"))
    }
}

/// A Linux-style home with one regular profile; returns the profile path
pub fn make_home_with_profile(home: &Path) -> PathBuf {
    let base = home.join(".zen");
    fs::create_dir_all(&base).unwrap();
    fs::write(
        base.join("profiles.ini"),
        "[General]\nVersion=2\n\n[Profile0]\nName=Default\nIsRelative=1\nPath=abcd.default\n",
    )
    .unwrap();
    let profile = base.join("abcd.default");
    fs::create_dir_all(&profile).unwrap();
    profile
}

/// Write every manifest entry into `profile`
pub fn populate_profile(profile: &Path) {
    let conn = rusqlite::Connection::open(profile.join("places.sqlite")).unwrap();
    conn.execute_batch(
        "CREATE TABLE moz_bookmarks (id INTEGER PRIMARY KEY, title TEXT);
         INSERT INTO moz_bookmarks (title) VALUES ('Rust Book'), ('crates.io');",
    )
    .unwrap();
    drop(conn);

    let conn = rusqlite::Connection::open(profile.join("favicons.sqlite")).unwrap();
    conn.execute_batch("CREATE TABLE moz_icons (id INTEGER PRIMARY KEY, url TEXT);")
        .unwrap();
    drop(conn);

    fs::write(profile.join("sessionstore.jsonlz4"), b"mozLz40\0\x01\x02\x03").unwrap();
    fs::write(profile.join("zen-sessions.jsonlz4"), b"mozLz40\0\x04\x05").unwrap();
    fs::write(profile.join("zen-keyboard-shortcuts.json"), r#"{"shortcuts":[]}"#).unwrap();
    fs::write(profile.join("zen-themes.json"), r#"{"theme":"dark"}"#).unwrap();
    fs::write(profile.join("zen-themes.css"), ":root { --accent: red; }").unwrap();
    fs::write(profile.join("containers.json"), r#"{"identities":[]}"#).unwrap();

    fs::create_dir_all(profile.join("chrome/icons")).unwrap();
    fs::write(profile.join("chrome/userChrome.css"), "#TabsToolbar { visibility: collapse; }")
        .unwrap();
    fs::write(profile.join("chrome/icons/logo.svg"), "<svg/>").unwrap();

    fs::create_dir_all(profile.join("sessionstore-backups")).unwrap();
    fs::write(profile.join("sessionstore-backups/recovery.jsonlz4"), b"recovery").unwrap();
}

/// Context over a temp home, a fake remote and a quiet process table
pub fn context(home: &Path, config_dir: &Path, remote: &FakeRemote) -> SyncContext {
    SyncContext {
        store: ConfigStore::new(config_dir.join("repository.json")),
        locator: ProfileLocator::new(Platform::Linux, home),
        vcs: Box::new(remote.clone()),
        archiver: Box::new(TarGzArchiver),
        snapshotter: Box::new(SqliteSnapshotter),
        processes: Box::new(FixedProcesses(vec!["bash".to_string()])),
        interactive: false,
    }
}

pub fn bookmark_titles(db: &Path) -> Vec<String> {
    let conn = rusqlite::Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare("SELECT title FROM moz_bookmarks ORDER BY id")
        .unwrap();
    let titles: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    titles
}
