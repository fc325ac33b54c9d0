//! The intermediate-representation stage seam.
//!
//! Linking, optimization, and code generation are external collaborators
//! addressed purely through the [`IrStages`] trait. [`IrPipeline`] owns the
//! once-per-build memoization and the discovery of generated compilation
//! units; the stage internals stay opaque.
use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::process::run_tool;

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of generated compiler-intermediate files
pub const UNIT_EXTENSION: &str = "ll";

/// Result of IR linking: the reachable-code closure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResult {
    /// Reachable definition names
    pub defns: Vec<String>,
    /// Native libraries required by reachable code
    pub links: Vec<String>,
    /// Symbols referenced but not defined anywhere on the classpath
    pub unresolved: Vec<String>,
}

/// Reachable definitions after the optimizer has run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedIr {
    pub defns: Vec<String>,
}

/// One generated compiler-intermediate file, paired with its object output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub ll_path: PathBuf,
}

impl CompilationUnit {
    pub fn new(ll_path: impl Into<PathBuf>) -> Self {
        Self {
            ll_path: ll_path.into(),
        }
    }

    /// Object file path: the unit path with `.o` appended
    pub fn object_path(&self) -> PathBuf {
        let mut path = OsString::from(self.ll_path.as_os_str());
        path.push(".o");
        PathBuf::from(path)
    }
}

/// The three IR stages, each invoked with the build configuration and
/// returning a result; internals are out of scope.
pub trait IrStages {
    /// Link the classpath's IR into the reachable-code closure
    fn link(&self, config: &BuildConfig) -> BuildResult<LinkResult>;

    /// Optimize the linked definitions
    fn optimize(&self, config: &BuildConfig, linked: &LinkResult) -> BuildResult<OptimizedIr>;

    /// Generate compiler-intermediate files under the work directory
    fn codegen(&self, config: &BuildConfig, optimized: &OptimizedIr) -> BuildResult<()>;
}

/// Staged IR pipeline with once-per-build memoization.
///
/// Stages run strictly sequentially; each is evaluated at most once per
/// pipeline instance, and `link` fails before anything else runs when
/// unresolved symbols remain.
pub struct IrPipeline<'a, S: IrStages> {
    stages: &'a S,
    config: &'a BuildConfig,
    linked: Option<LinkResult>,
    optimized: Option<OptimizedIr>,
    units: Option<Vec<CompilationUnit>>,
}

impl<'a, S: IrStages> IrPipeline<'a, S> {
    pub fn new(stages: &'a S, config: &'a BuildConfig) -> Self {
        Self {
            stages,
            config,
            linked: None,
            optimized: None,
            units: None,
        }
    }

    /// Link the IR; fails with the sorted, comma-joined unresolved symbol
    /// list if any symbol cannot be resolved.
    pub fn link(&mut self) -> BuildResult<&LinkResult> {
        if self.linked.is_none() {
            let result = self.stages.link(self.config)?;
            if !result.unresolved.is_empty() {
                return Err(BuildError::unresolved(&result.unresolved));
            }
            self.linked = Some(result);
        }
        Ok(self.linked.as_ref().unwrap())
    }

    /// Optimize the linked definitions
    pub fn optimize(&mut self) -> BuildResult<&OptimizedIr> {
        if self.optimized.is_none() {
            self.link()?;
            let linked = self.linked.as_ref().unwrap();
            let optimized = self.stages.optimize(self.config, linked)?;
            self.optimized = Some(optimized);
        }
        Ok(self.optimized.as_ref().unwrap())
    }

    /// Generate compiler-intermediate files and discover them: every `.ll`
    /// file under the work directory, recursively.
    pub fn codegen(&mut self) -> BuildResult<&[CompilationUnit]> {
        if self.units.is_none() {
            self.optimize()?;
            let optimized = self.optimized.as_ref().unwrap();
            self.stages.codegen(self.config, optimized)?;
            let units = discover_units(&self.config.work_dir);
            self.units = Some(units);
        }
        Ok(self.units.as_ref().unwrap())
    }
}

/// Collect all compiler-intermediate files under a directory, sorted by path
/// for stable downstream ordering.
pub fn discover_units(work_dir: &Path) -> Vec<CompilationUnit> {
    let mut units: Vec<CompilationUnit> = WalkDir::new(work_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == UNIT_EXTENSION)
                .unwrap_or(false)
        })
        .map(|e| CompilationUnit::new(e.path()))
        .collect();
    units.sort_by(|a, b| a.ll_path.cmp(&b.ll_path));
    units
}

/// [`IrStages`] backed by an external IR-driver executable.
///
/// The driver is invoked once per stage (`link`, `optimize`, `codegen`) with
/// the classpath, work directory, and entry point; the link stage's result is
/// read back from `link-result.json` in the work directory.
pub struct DriverStages {
    driver: PathBuf,
}

/// File the driver writes its link result to, relative to the work directory
pub const LINK_RESULT_FILE: &str = "link-result.json";

impl DriverStages {
    pub fn new(driver: impl Into<PathBuf>) -> Self {
        Self {
            driver: driver.into(),
        }
    }

    fn run_stage(&self, stage: &'static str, config: &BuildConfig) -> BuildResult<()> {
        let classpath = std::env::join_paths(&config.classpath)
            .map_err(|e| BuildError::StageFailed {
                stage,
                detail: format!("unrepresentable classpath: {e}"),
            })?
            .to_string_lossy()
            .into_owned();

        let args = vec![
            stage.to_string(),
            "--classpath".to_string(),
            classpath,
            "--workdir".to_string(),
            config.work_dir.display().to_string(),
            "--main".to_string(),
            config.entry_point.clone(),
        ];
        let output = run_tool(&self.driver, &args)?;
        if !output.success() {
            return Err(BuildError::StageFailed {
                stage,
                detail: output.detail().to_string(),
            });
        }
        Ok(())
    }
}

impl IrStages for DriverStages {
    fn link(&self, config: &BuildConfig) -> BuildResult<LinkResult> {
        self.run_stage("link", config)?;
        let result_path = config.work_dir.join(LINK_RESULT_FILE);
        let contents =
            fs::read_to_string(&result_path).map_err(|e| BuildError::io(&result_path, e))?;
        serde_json::from_str(&contents).map_err(|e| BuildError::StageFailed {
            stage: "link",
            detail: format!("malformed {LINK_RESULT_FILE}: {e}"),
        })
    }

    fn optimize(&self, config: &BuildConfig, linked: &LinkResult) -> BuildResult<OptimizedIr> {
        self.run_stage("optimize", config)?;
        Ok(OptimizedIr {
            defns: linked.defns.clone(),
        })
    }

    fn codegen(&self, config: &BuildConfig, _optimized: &OptimizedIr) -> BuildResult<()> {
        self.run_stage("codegen", config)
    }
}
