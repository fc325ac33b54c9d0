//! Parallel compilation of generated compiler-intermediate files.
//!
//! Units are regenerated every build, so there is no incremental skip here;
//! every unit is always recompiled.
use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::ir::CompilationUnit;
use crate::process::run_tool;

use rayon::prelude::*;
use std::path::PathBuf;

/// Compiles compiler-intermediate files to native objects
pub struct UnitCompiler<'a> {
    config: &'a BuildConfig,
}

impl<'a> UnitCompiler<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Compile every unit in parallel; returns object paths in unit order.
    ///
    /// The first failure among the unordered parallel results aborts the
    /// stage.
    pub fn compile_all(&self, units: &[CompilationUnit]) -> BuildResult<Vec<PathBuf>> {
        if self.config.verbose {
            println!("Compiling {} compilation units", units.len());
        }
        units
            .par_iter()
            .map(|unit| self.compile_unit(unit))
            .collect()
    }

    fn compile_unit(&self, unit: &CompilationUnit) -> BuildResult<PathBuf> {
        let object = unit.object_path();
        let mut args = self.config.compile_args();
        args.push("-c".to_string());
        args.push(unit.ll_path.display().to_string());
        args.push("-o".to_string());
        args.push(object.display().to_string());

        let output = run_tool(&self.config.clangpp, &args)?;
        if !output.success() {
            return Err(BuildError::unit_compile(&unit.ll_path, output.detail()));
        }
        Ok(object)
    }
}
