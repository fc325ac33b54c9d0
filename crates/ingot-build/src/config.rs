//! Build configuration: the immutable record every pipeline stage reads from
use crate::error::{BuildError, BuildResult};
use crate::toolchain;

use std::path::PathBuf;

/// Garbage collector selection for the produced binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GarbageCollector {
    /// No collector; allocations are never reclaimed
    None,
    /// Boehm-Demers-Weiser conservative collector
    Boehm,
    /// Bundled Immix collector
    Immix,
}

impl GarbageCollector {
    /// Canonical name, as used in the runtime source tree (`gc/<name>/...`)
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Boehm => "boehm",
            Self::Immix => "immix",
        }
    }

    /// Extra system libraries this collector requires at link time
    pub fn link_libraries(&self) -> &'static [&'static str] {
        match self {
            Self::Boehm => &["gc"],
            Self::None | Self::Immix => &[],
        }
    }

    /// Parse a collector name as given on the command line
    pub fn parse(name: &str) -> BuildResult<Self> {
        match name {
            "none" => Ok(Self::None),
            "boehm" => Ok(Self::Boehm),
            "immix" => Ok(Self::Immix),
            other => Err(BuildError::InvalidConfig(format!(
                "unknown garbage collector '{}', expected one of: none, boehm, immix",
                other
            ))),
        }
    }
}

impl std::fmt::Display for GarbageCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Build mode, selecting the optimization level passed to the native compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Debug,
    Release,
}

impl Mode {
    /// Optimization flag for native compilation in this mode
    pub fn opt_flag(&self) -> &'static str {
        match self {
            Self::Debug => "-O0",
            Self::Release => "-O2",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Immutable build configuration.
///
/// Constructed once per build (toolchain discovery and environment lookups
/// happen here, never mid-pipeline) and passed by reference to every stage.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Selected garbage collector
    pub gc: GarbageCollector,
    /// Build mode
    pub mode: Mode,
    /// Path to the C compiler
    pub clang: PathBuf,
    /// Path to the C++ compiler (also used for the final link)
    pub clangpp: PathBuf,
    /// Target triple detected from the C compiler
    pub target_triple: String,
    /// Extra compile flags (include search dirs)
    pub compile_flags: Vec<String>,
    /// Extra link flags (library search dirs)
    pub link_flags: Vec<String>,
    /// Fully-qualified entry-point symbol
    pub entry_point: String,
    /// Ordered classpath of IR artifacts
    pub classpath: Vec<PathBuf>,
    /// Work directory owning every build artifact
    pub work_dir: PathBuf,
    /// The bundled runtime-support archive
    pub runtime_archive: PathBuf,
    /// Print stage progress to stdout
    pub verbose: bool,
}

impl BuildConfig {
    /// Build a configuration by discovering the toolchain.
    ///
    /// Locates clang and clang++ (environment overrides first, then versioned
    /// `PATH` candidates), probes the target triple, queries llvm-config for
    /// include/library search directories, and finds the runtime-support
    /// archive on the classpath.
    pub fn discover(
        classpath: Vec<PathBuf>,
        work_dir: PathBuf,
        entry_point: impl Into<String>,
    ) -> BuildResult<Self> {
        Self::discover_with(classpath, work_dir, entry_point, None, None)
    }

    /// Like [`BuildConfig::discover`], with explicit compiler overrides taking
    /// precedence over both environment variables and `PATH` search.
    pub fn discover_with(
        classpath: Vec<PathBuf>,
        work_dir: PathBuf,
        entry_point: impl Into<String>,
        clang_override: Option<PathBuf>,
        clangpp_override: Option<PathBuf>,
    ) -> BuildResult<Self> {
        let clang = match clang_override {
            Some(path) => path,
            None => toolchain::discover("clang", toolchain::CLANG_VERSIONS)?,
        };
        let clangpp = match clangpp_override {
            Some(path) => path,
            None => toolchain::discover("clang++", toolchain::CLANG_VERSIONS)?,
        };

        let target_triple = toolchain::detect_target_triple(&clang, &work_dir)?;
        let compile_flags = toolchain::include_flags();
        let link_flags = toolchain::lib_flags();
        let runtime_archive = find_runtime_archive(&classpath)?;

        Ok(Self {
            gc: GarbageCollector::Immix,
            mode: Mode::Debug,
            clang,
            clangpp,
            target_triple,
            compile_flags,
            link_flags,
            entry_point: entry_point.into(),
            classpath,
            work_dir,
            runtime_archive,
            verbose: false,
        })
    }

    /// Set the garbage collector
    pub fn with_gc(mut self, gc: GarbageCollector) -> Self {
        self.gc = gc;
        self
    }

    /// Set the build mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the runtime-support archive location
    pub fn with_runtime_archive(mut self, archive: PathBuf) -> Self {
        self.runtime_archive = archive;
        self
    }

    /// Enable/disable progress output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Full native compile options: mode optimization flag plus include dirs
    pub fn compile_args(&self) -> Vec<String> {
        let mut args = vec![self.mode.opt_flag().to_string()];
        args.extend(self.compile_flags.iter().cloned());
        args
    }
}

/// Locate the runtime-support archive on the classpath by file-name convention.
fn find_runtime_archive(classpath: &[PathBuf]) -> BuildResult<PathBuf> {
    classpath
        .iter()
        .find(|entry| {
            entry
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.contains("runtimelib"))
                .unwrap_or(false)
        })
        .cloned()
        .ok_or_else(|| {
            BuildError::InvalidConfig(
                "no runtime-support archive (runtimelib) found on the classpath".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gc_names_and_libraries() {
        assert_eq!(GarbageCollector::None.name(), "none");
        assert_eq!(GarbageCollector::Boehm.name(), "boehm");
        assert_eq!(GarbageCollector::Immix.name(), "immix");
        assert_eq!(GarbageCollector::Boehm.link_libraries(), &["gc"]);
        assert!(GarbageCollector::Immix.link_libraries().is_empty());
        assert!(GarbageCollector::None.link_libraries().is_empty());
    }

    #[test]
    fn test_gc_parse() {
        assert_eq!(GarbageCollector::parse("boehm").unwrap(), GarbageCollector::Boehm);
        assert_eq!(GarbageCollector::parse("immix").unwrap(), GarbageCollector::Immix);
        assert_eq!(GarbageCollector::parse("none").unwrap(), GarbageCollector::None);
        let err = GarbageCollector::parse("cheney").unwrap_err();
        assert!(err.to_string().contains("cheney"));
    }

    #[test]
    fn test_mode_opt_flags() {
        assert_eq!(Mode::Debug.opt_flag(), "-O0");
        assert_eq!(Mode::Release.opt_flag(), "-O2");
    }

    #[test]
    fn test_find_runtime_archive() {
        let classpath = vec![
            PathBuf::from("app/classes.jar"),
            PathBuf::from("deps/runtimelib-0.1.0.jar"),
        ];
        let found = find_runtime_archive(&classpath).unwrap();
        assert_eq!(found, PathBuf::from("deps/runtimelib-0.1.0.jar"));
    }

    #[test]
    fn test_find_runtime_archive_missing() {
        let classpath = vec![PathBuf::from("app/classes.jar")];
        assert!(find_runtime_archive(&classpath).is_err());
    }
}
