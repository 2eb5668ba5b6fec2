use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::Path;
use tar::{Archive, Builder};

/// Creates and extracts compressed directory archives
pub trait Archiver {
    /// Archive `root/name` into `archive`, storing entries as `name/...`.
    fn create(&self, root: &Path, name: &str, archive: &Path) -> Result<()>;

    /// Extract `archive` into `dest`.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// gzip-compressed tarballs
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzArchiver;

impl Archiver for TarGzArchiver {
    fn create(&self, root: &Path, name: &str, archive: &Path) -> Result<()> {
        let file = File::create(archive)
            .with_context(|| format!("Failed to create archive: {}", archive.display()))?;

        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);
        builder.follow_symlinks(false);

        builder
            .append_dir_all(name, root.join(name))
            .with_context(|| format!("Failed to archive directory: {name}"))?;

        builder
            .into_inner()
            .context("Failed to finish archive")?
            .finish()
            .context("Failed to finish compression")?;

        Ok(())
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive)
            .with_context(|| format!("Failed to open archive: {}", archive.display()))?;

        let mut archive_reader = Archive::new(GzDecoder::new(file));
        archive_reader.set_preserve_mtime(true);
        archive_reader
            .unpack(dest)
            .with_context(|| format!("Failed to extract {} into {}", archive.display(), dest.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_archive_entries_are_relative() {
        let profile = TempDir::new().unwrap();
        let chrome = profile.path().join("chrome");
        fs::create_dir_all(chrome.join("icons")).unwrap();
        fs::write(chrome.join("userChrome.css"), "#nav-bar { display: none }").unwrap();
        fs::write(chrome.join("icons/star.svg"), "<svg/>").unwrap();

        let out = TempDir::new().unwrap();
        let tarball = out.path().join("chrome.tar.gz");
        TarGzArchiver.create(profile.path(), "chrome", &tarball).unwrap();

        let mut archive = Archive::new(GzDecoder::new(File::open(&tarball).unwrap()));
        for entry in archive.entries().unwrap() {
            let path = entry.unwrap().path().unwrap().into_owned();
            assert!(path.is_relative(), "absolute entry {}", path.display());
            assert!(path.starts_with("chrome"));
        }
    }

    #[test]
    fn test_extract_restores_directory_in_place() {
        let profile = TempDir::new().unwrap();
        fs::create_dir_all(profile.path().join("chrome")).unwrap();
        fs::write(profile.path().join("chrome/userContent.css"), "body {}").unwrap();

        let out = TempDir::new().unwrap();
        let tarball = out.path().join("chrome.tar.gz");
        TarGzArchiver.create(profile.path(), "chrome", &tarball).unwrap();

        let fresh = TempDir::new().unwrap();
        TarGzArchiver.extract(&tarball, fresh.path()).unwrap();

        assert_eq!(
            fs::read_to_string(fresh.path().join("chrome/userContent.css")).unwrap(),
            "body {}"
        );
    }
}
