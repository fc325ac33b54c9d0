//! Ingot tool acquisition
//!
//! Thin glue over a remote tools manifest, package repositories, and HTTP
//! fetch: look up a named tool's coordinates, walk its dependency graph, and
//! download the resulting artifacts into a local cache directory.

pub mod download;
pub mod error;
pub mod manifest;
pub mod resolver;

pub use download::{download_all, Downloader};
pub use error::{FetchError, FetchResult};
pub use manifest::{Coordinates, ToolEntry, ToolsManifest};
pub use resolver::{HttpRepositories, MetadataSource, ResolvedArtifact, Resolver};
