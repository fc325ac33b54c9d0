//! Remote tools manifest: names tools and maps them to artifact coordinates.
use crate::error::{FetchError, FetchResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maven-style artifact coordinates, `group:name:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinates {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl Coordinates {
    /// Parse `group:name:version`
    pub fn parse(text: &str) -> FetchResult<Self> {
        let mut parts = text.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(name), Some(version), None)
                if !group.is_empty() && !name.is_empty() && !version.is_empty() =>
            {
                Ok(Self {
                    group: group.to_string(),
                    name: name.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(FetchError::InvalidCoordinates(text.to_string())),
        }
    }

    /// Repository path prefix: group dots become slashes
    pub fn repo_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.group.replace('.', "/"),
            self.name,
            self.version
        )
    }

    /// File name of the artifact jar
    pub fn artifact_file(&self) -> String {
        format!("{}-{}.jar", self.name, self.version)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl Serialize for Coordinates {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// One tool the manifest knows about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolEntry {
    /// Coordinates of the tool's launcher artifact
    pub coordinates: Coordinates,
    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The remote tools manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsManifest {
    /// Tool name -> entry
    pub tools: BTreeMap<String, ToolEntry>,
    /// Package repository base URLs, tried in order
    pub repositories: Vec<String>,
}

impl ToolsManifest {
    /// Parse a manifest from JSON text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> FetchResult<Self> {
        serde_json::from_str(text).map_err(|e| FetchError::parse("tools manifest", e))
    }

    /// Fetch and parse the manifest from a URL
    pub fn fetch(url: &str) -> FetchResult<Self> {
        let text = reqwest::blocking::get(url)?.error_for_status()?.text()?;
        Self::from_str(&text)
    }

    /// Look up a tool by name
    pub fn tool(&self, name: &str) -> FetchResult<&ToolEntry> {
        self.tools
            .get(name)
            .ok_or_else(|| FetchError::ToolNotFound(name.to_string()))
    }
}
