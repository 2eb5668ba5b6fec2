use anyhow::{Context, Result};
use rusqlite::{Connection, DatabaseName, OpenFlags};
use std::path::Path;

/// Takes a consistent copy of a live database
pub trait DatabaseSnapshotter {
    fn snapshot(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// Uses SQLite's online backup API, which is safe while another process
/// holds the database open.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteSnapshotter;

impl DatabaseSnapshotter for SqliteSnapshotter {
    fn snapshot(&self, source: &Path, dest: &Path) -> Result<()> {
        let src = Connection::open_with_flags(
            source,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open source database: {}", source.display()))?;

        if dest.exists() {
            std::fs::remove_file(dest)
                .with_context(|| format!("Failed to replace {}", dest.display()))?;
        }

        src.backup(DatabaseName::Main, dest, None)
            .with_context(|| format!("Snapshot of {} failed", source.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_copies_rows() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("places.sqlite");
        let conn = Connection::open(&source).unwrap();
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             CREATE TABLE moz_bookmarks (id INTEGER PRIMARY KEY, title TEXT);
             INSERT INTO moz_bookmarks (title) VALUES ('Rust'), ('Zen');",
        )
        .unwrap();

        let dest = temp.path().join("snapshot.sqlite");
        SqliteSnapshotter.snapshot(&source, &dest).unwrap();
        drop(conn);

        let copy = Connection::open(&dest).unwrap();
        let count: i64 = copy
            .query_row("SELECT COUNT(*) FROM moz_bookmarks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_snapshot_of_non_database_fails() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("places.sqlite");
        std::fs::write(&source, vec![b'x'; 4096]).unwrap();

        assert!(SqliteSnapshotter
            .snapshot(&source, &temp.path().join("out.sqlite"))
            .is_err());
    }
}
