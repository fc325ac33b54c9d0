//! Content-hash cache for the unpacked runtime-support archive.
//!
//! The unpacked tree is valid iff it exists and the marker file holds the
//! SHA-256 of the current archive. Any mismatch means full delete-and-reunpack.
use crate::error::{BuildError, BuildResult};

use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Compute the hex SHA-256 fingerprint of an archive's bytes
pub fn fingerprint(archive: &Path) -> BuildResult<String> {
    let bytes = fs::read(archive).map_err(|e| BuildError::io(archive, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether the unpacked tree is current for the archive.
///
/// True iff the unpacked directory exists, the marker file exists, and the
/// marker's bytes equal the freshly computed fingerprint.
pub fn is_current(archive: &Path, unpacked_dir: &Path, marker: &Path) -> BuildResult<bool> {
    if !unpacked_dir.exists() || !marker.exists() {
        return Ok(false);
    }
    let stored = fs::read_to_string(marker).map_err(|e| BuildError::io(marker, e))?;
    Ok(stored == fingerprint(archive)?)
}

/// Delete the unpacked tree, re-extract the archive, and write the marker.
///
/// The marker is written last, so an interrupted refresh is seen as stale by
/// the next [`is_current`] check.
pub fn refresh(archive: &Path, unpacked_dir: &Path, marker: &Path) -> BuildResult<()> {
    if unpacked_dir.exists() {
        fs::remove_dir_all(unpacked_dir).map_err(|e| BuildError::io(unpacked_dir, e))?;
    }
    fs::create_dir_all(unpacked_dir).map_err(|e| BuildError::io(unpacked_dir, e))?;

    let file = fs::File::open(archive).map_err(|e| BuildError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)?;
    zip.extract(unpacked_dir)?;

    let hash = fingerprint(archive)?;
    fs::write(marker, hash).map_err(|e| BuildError::io(marker, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn write_archive(dir: &Path, name: &str, entries: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (entry_name, contents) in entries {
            writer
                .start_file(*entry_name, FileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_refresh_then_current() {
        let tmp = TempDir::new().unwrap();
        let archive = write_archive(tmp.path(), "rt.jar", &[("native/check.c", "int x;\n")]);
        let unpacked = tmp.path().join("lib");
        let marker = unpacked.join("jarhash");

        assert!(!is_current(&archive, &unpacked, &marker).unwrap());
        refresh(&archive, &unpacked, &marker).unwrap();
        assert!(is_current(&archive, &unpacked, &marker).unwrap());
        assert!(unpacked.join("native/check.c").exists());
    }

    #[test]
    fn test_changed_archive_invalidates() {
        let tmp = TempDir::new().unwrap();
        let archive = write_archive(tmp.path(), "rt.jar", &[("a.c", "int a;\n")]);
        let unpacked = tmp.path().join("lib");
        let marker = unpacked.join("jarhash");

        refresh(&archive, &unpacked, &marker).unwrap();
        assert!(is_current(&archive, &unpacked, &marker).unwrap());

        // Rewrite the archive with different bytes; no refresh.
        write_archive(tmp.path(), "rt.jar", &[("a.c", "int b;\n")]);
        assert!(!is_current(&archive, &unpacked, &marker).unwrap());
    }

    #[test]
    fn test_missing_unpacked_dir_is_stale() {
        let tmp = TempDir::new().unwrap();
        let archive = write_archive(tmp.path(), "rt.jar", &[("a.c", "int a;\n")]);
        let unpacked = tmp.path().join("lib");
        let marker = unpacked.join("jarhash");

        refresh(&archive, &unpacked, &marker).unwrap();
        fs::remove_dir_all(&unpacked).unwrap();
        assert!(!is_current(&archive, &unpacked, &marker).unwrap());
    }

    #[test]
    fn test_refresh_replaces_previous_tree() {
        let tmp = TempDir::new().unwrap();
        let archive = write_archive(tmp.path(), "rt.jar", &[("old.c", "int a;\n")]);
        let unpacked = tmp.path().join("lib");
        let marker = unpacked.join("jarhash");
        refresh(&archive, &unpacked, &marker).unwrap();

        let archive = write_archive(tmp.path(), "rt.jar", &[("new.c", "int b;\n")]);
        refresh(&archive, &unpacked, &marker).unwrap();
        assert!(!unpacked.join("old.c").exists());
        assert!(unpacked.join("new.c").exists());
        assert!(is_current(&archive, &unpacked, &marker).unwrap());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let tmp = TempDir::new().unwrap();
        let archive = write_archive(tmp.path(), "rt.jar", &[("a.c", "int a;\n")]);
        assert_eq!(
            fingerprint(&archive).unwrap(),
            fingerprint(&archive).unwrap()
        );
    }
}
