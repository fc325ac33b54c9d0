//! Artifact download into a local cache directory.
use crate::error::{FetchError, FetchResult};
use crate::resolver::{HttpRepositories, ResolvedArtifact};

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Downloads resolved artifacts, skipping files already in the cache
pub struct Downloader<'a> {
    repositories: &'a HttpRepositories,
    out_dir: PathBuf,
}

impl<'a> Downloader<'a> {
    pub fn new(repositories: &'a HttpRepositories, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            repositories,
            out_dir: out_dir.into(),
        }
    }

    /// Download one artifact; returns its cache path.
    ///
    /// Already-present files are not re-downloaded and not re-verified.
    pub fn download(&self, artifact: &ResolvedArtifact) -> FetchResult<PathBuf> {
        let target = self.out_dir.join(artifact.coordinates.artifact_file());
        if target.exists() {
            return Ok(target);
        }
        fs::create_dir_all(&self.out_dir)?;

        for base in self.repositories.repositories() {
            let url = HttpRepositories::artifact_url(base, &artifact.coordinates);
            let response = match self.repositories.client().get(&url).send() {
                Ok(response) => response,
                Err(_) => continue,
            };
            if !response.status().is_success() {
                continue;
            }
            let bytes = response.bytes()?;

            if let Some(expected) = &artifact.sha256 {
                verify_checksum(&artifact.coordinates.to_string(), &bytes, expected)?;
            }

            fs::write(&target, &bytes)?;
            return Ok(target);
        }

        Err(FetchError::ArtifactNotFound(
            artifact.coordinates.to_string(),
        ))
    }
}

/// Download every artifact; returns cache paths in input order.
pub fn download_all(
    repositories: &HttpRepositories,
    artifacts: &[ResolvedArtifact],
    out_dir: &Path,
) -> FetchResult<Vec<PathBuf>> {
    let downloader = Downloader::new(repositories, out_dir);
    artifacts.iter().map(|a| downloader.download(a)).collect()
}

/// Check downloaded bytes against an expected hex SHA-256
fn verify_checksum(artifact: &str, bytes: &[u8], expected: &str) -> FetchResult<()> {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let actual = format!("{:x}", hasher.finalize());
    if actual != expected.to_lowercase() {
        return Err(FetchError::ChecksumMismatch {
            artifact: artifact.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Coordinates;
    use tempfile::TempDir;

    fn artifact(coords: &str) -> ResolvedArtifact {
        ResolvedArtifact {
            coordinates: Coordinates::parse(coords).unwrap(),
            sha256: None,
        }
    }

    #[test]
    fn test_present_artifact_is_not_redownloaded() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join("ingot-fmt-0.3.1.jar");
        fs::write(&cached, b"cached bytes").unwrap();

        // No repositories configured: any network attempt would fail.
        let repositories = HttpRepositories::new(Vec::new());
        let downloader = Downloader::new(&repositories, tmp.path());
        let path = downloader
            .download(&artifact("org.ingot:ingot-fmt:0.3.1"))
            .unwrap();
        assert_eq!(path, cached);
        assert_eq!(fs::read(&path).unwrap(), b"cached bytes");
    }

    #[test]
    fn test_missing_artifact_with_no_repositories() {
        let tmp = TempDir::new().unwrap();
        let repositories = HttpRepositories::new(Vec::new());
        let downloader = Downloader::new(&repositories, tmp.path());
        let err = downloader
            .download(&artifact("org.ingot:ingot-fmt:0.3.1"))
            .unwrap_err();
        assert!(matches!(err, FetchError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_verify_checksum() {
        // SHA-256 of "abc"
        let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert!(verify_checksum("a:b:1.0.0", b"abc", expected).is_ok());

        let err = verify_checksum("a:b:1.0.0", b"abd", expected).unwrap_err();
        assert!(matches!(err, FetchError::ChecksumMismatch { .. }));
    }
}
