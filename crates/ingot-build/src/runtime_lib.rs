//! Runtime-support library assembly.
//!
//! Unpacks the bundled runtime archive (fingerprint-guarded), classifies each
//! C/C++ source once by its directory position, prunes objects of excluded
//! sources, and compiles included sources that have no object yet, in
//! parallel. Objects that already exist are never recompiled.
use crate::cache;
use crate::config::{BuildConfig, GarbageCollector};
use crate::error::{BuildError, BuildResult};
use crate::ir::LinkResult;
use crate::process::run_tool;

use rayon::prelude::*;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subdirectory of the work directory holding the unpacked runtime tree
pub const LIB_DIR: &str = "lib";
/// Fingerprint marker file inside the unpacked tree
pub const MARKER_FILE: &str = "jarhash";

/// Language-standard flag passed when compiling C++ runtime sources
const CPP_STANDARD: &str = "-std=c++11";

/// How a runtime source participates in the build, decided once from its
/// directory position when the tree is scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Always compiled
    Unconditional,
    /// Under `gc/`; compiled only for the named collector
    Gc(String),
    /// Under `optional/`; compiled only when the named library is required
    Optional(String),
}

/// One C/C++ source inside the unpacked runtime tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSource {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl RuntimeSource {
    /// Object file path: the source path with `.o` appended
    pub fn object_path(&self) -> PathBuf {
        let mut path = OsString::from(self.path.as_os_str());
        path.push(".o");
        PathBuf::from(path)
    }

    pub fn is_cpp(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "cpp")
            .unwrap_or(false)
    }

    /// Whether this source is part of the current build
    pub fn included(&self, gc: GarbageCollector, link_result: &LinkResult) -> bool {
        match &self.kind {
            SourceKind::Unconditional => true,
            SourceKind::Gc(name) => name == gc.name(),
            SourceKind::Optional(name) => link_result.links.iter().any(|lib| lib == name),
        }
    }
}

/// Classify a source by its path relative to the unpacked tree root.
///
/// `optional/` wins over `gc/`; the component following `gc` names the
/// collector (extension-stripped when it is the file itself).
pub fn classify(root: &Path, path: &Path) -> SourceKind {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let components: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if components.iter().any(|c| c == "optional") {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return SourceKind::Optional(stem);
    }

    if let Some(gc_at) = components.iter().position(|c| c == "gc") {
        if let Some(next) = components.get(gc_at + 1) {
            let name = if gc_at + 2 == components.len() {
                // `gc/<file>`: strip the extension
                Path::new(next)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| next.clone())
            } else {
                next.clone()
            };
            return SourceKind::Gc(name);
        }
    }

    SourceKind::Unconditional
}

/// Scan the unpacked tree for C/C++ sources and classify each one
pub fn scan_sources(lib_dir: &Path) -> Vec<RuntimeSource> {
    let mut sources: Vec<RuntimeSource> = WalkDir::new(lib_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "c" || ext == "cpp")
                .unwrap_or(false)
        })
        .map(|e| RuntimeSource {
            kind: classify(lib_dir, e.path()),
            path: e.path().to_path_buf(),
        })
        .collect();
    sources.sort_by(|a, b| a.path.cmp(&b.path));
    sources
}

/// Assembles the runtime-support object directory for one build
pub struct RuntimeLibraryAssembler<'a> {
    config: &'a BuildConfig,
}

impl<'a> RuntimeLibraryAssembler<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Produce `<work_dir>/lib` with an object file for every source the
    /// selected collector and the reachable code require.
    pub fn assemble(&self, link_result: &LinkResult) -> BuildResult<PathBuf> {
        let lib_dir = self.config.work_dir.join(LIB_DIR);
        let marker = lib_dir.join(MARKER_FILE);

        if !cache::is_current(&self.config.runtime_archive, &lib_dir, &marker)? {
            if self.config.verbose {
                println!("Unpacking runtime support into {}", lib_dir.display());
            }
            cache::refresh(&self.config.runtime_archive, &lib_dir, &marker)?;
        }

        let sources = scan_sources(&lib_dir);
        let (included, excluded): (Vec<_>, Vec<_>) = sources
            .into_iter()
            .partition(|src| src.included(self.config.gc, link_result));

        // Objects of sources excluded from this build are stale; drop them.
        for src in &excluded {
            let object = src.object_path();
            if object.exists() {
                fs::remove_file(&object).map_err(|e| BuildError::io(&object, e))?;
            }
        }

        let to_compile: Vec<&RuntimeSource> = included
            .iter()
            .filter(|src| !src.object_path().exists())
            .collect();

        if self.config.verbose {
            println!(
                "Compiling {} runtime sources ({} already current)",
                to_compile.len(),
                included.len() - to_compile.len()
            );
        }

        to_compile
            .par_iter()
            .try_for_each(|src| self.compile_source(src))?;

        Ok(lib_dir)
    }

    fn compile_source(&self, src: &RuntimeSource) -> BuildResult<()> {
        let compiler = if src.is_cpp() {
            &self.config.clangpp
        } else {
            &self.config.clang
        };

        let mut args = self.config.compile_args();
        if src.is_cpp() {
            args.push(CPP_STANDARD.to_string());
        }
        args.push("-c".to_string());
        args.push(src.path.display().to_string());
        args.push("-o".to_string());
        args.push(src.object_path().display().to_string());

        let output = run_tool(compiler, &args)?;
        if !output.success() {
            return Err(BuildError::runtime_compile(&src.path, output.detail()));
        }
        Ok(())
    }
}

/// All object files currently present under the runtime tree, sorted
pub fn collect_objects(lib_dir: &Path) -> Vec<PathBuf> {
    let mut objects: Vec<PathBuf> = WalkDir::new(lib_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "o")
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    objects.sort();
    objects
}
