//! Dependency-graph resolution against package repositories.
//!
//! Deliberately thin: a breadth-first walk over each artifact's dependency
//! listing, keeping the highest version per (group, name) on conflict. No
//! constraint solving and no retry policy.
use crate::error::FetchResult;
use crate::manifest::Coordinates;

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Dependency listing a repository serves for one artifact
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default)]
    pub dependencies: Vec<Coordinates>,
    /// Hex SHA-256 of the artifact jar, when the repository publishes one
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Where dependency listings come from; backed by HTTP in production and by
/// in-memory tables in tests.
pub trait MetadataSource {
    /// Metadata for one artifact; `None` when no repository serves a listing
    /// (such artifacts are treated as dependency-free leaves).
    fn metadata(&self, coordinates: &Coordinates) -> FetchResult<Option<ArtifactMetadata>>;
}

/// One artifact selected by resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub coordinates: Coordinates,
    pub sha256: Option<String>,
}

/// Breadth-first dependency resolver
pub struct Resolver<'a, M: MetadataSource> {
    source: &'a M,
}

impl<'a, M: MetadataSource> Resolver<'a, M> {
    pub fn new(source: &'a M) -> Self {
        Self { source }
    }

    /// Resolve the full graph rooted at `root`.
    ///
    /// Returns one artifact per (group, name), highest version wins, sorted
    /// by coordinates for stable output.
    pub fn resolve(&self, root: &Coordinates) -> FetchResult<Vec<ResolvedArtifact>> {
        let mut winners: BTreeMap<(String, String), ResolvedArtifact> = BTreeMap::new();
        let mut visited: HashSet<Coordinates> = HashSet::new();
        let mut queue: VecDeque<Coordinates> = VecDeque::new();
        queue.push_back(root.clone());

        while let Some(coords) = queue.pop_front() {
            if !visited.insert(coords.clone()) {
                continue;
            }

            let metadata = self.source.metadata(&coords)?.unwrap_or_default();
            for dep in &metadata.dependencies {
                queue.push_back(dep.clone());
            }

            let key = (coords.group.clone(), coords.name.clone());
            let candidate = ResolvedArtifact {
                coordinates: coords,
                sha256: metadata.sha256,
            };
            let replace = match winners.get(&key) {
                Some(current) => version_newer(
                    &candidate.coordinates.version,
                    &current.coordinates.version,
                ),
                None => true,
            };
            if replace {
                winners.insert(key, candidate);
            }
        }

        Ok(winners.into_values().collect())
    }
}

/// Whether `candidate` is a newer version than `current`: semver comparison
/// when both parse, lexicographic otherwise.
fn version_newer(candidate: &str, current: &str) -> bool {
    match (
        semver::Version::parse(candidate),
        semver::Version::parse(current),
    ) {
        (Ok(a), Ok(b)) => a > b,
        _ => candidate > current,
    }
}

/// [`MetadataSource`] backed by HTTP package repositories, tried in order.
pub struct HttpRepositories {
    repositories: Vec<String>,
    client: reqwest::blocking::Client,
}

impl HttpRepositories {
    pub fn new(repositories: Vec<String>) -> Self {
        Self {
            repositories,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// URL of the dependency listing inside one repository
    pub fn metadata_url(base: &str, coordinates: &Coordinates) -> String {
        format!(
            "{}/{}/{}-{}.deps.json",
            base.trim_end_matches('/'),
            coordinates.repo_path(),
            coordinates.name,
            coordinates.version
        )
    }

    /// URL of the artifact jar inside one repository
    pub fn artifact_url(base: &str, coordinates: &Coordinates) -> String {
        format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            coordinates.repo_path(),
            coordinates.artifact_file()
        )
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    pub fn client(&self) -> &reqwest::blocking::Client {
        &self.client
    }
}

impl MetadataSource for HttpRepositories {
    fn metadata(&self, coordinates: &Coordinates) -> FetchResult<Option<ArtifactMetadata>> {
        for base in &self.repositories {
            let url = Self::metadata_url(base, coordinates);
            let response = match self.client.get(&url).send() {
                Ok(response) => response,
                Err(_) => continue,
            };
            if !response.status().is_success() {
                continue;
            }
            let metadata = response.json::<ArtifactMetadata>()?;
            return Ok(Some(metadata));
        }
        // No repository serves a listing: a dependency-free leaf.
        Ok(None)
    }
}
