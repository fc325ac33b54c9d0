//! Final native link: one C++-compiler invocation over every object file.
use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::ir::LinkResult;
use crate::process::run_tool;

use std::path::{Path, PathBuf};

/// Name of the produced executable, at the work-directory root
pub const OUTPUT_FILE: &str = "out";

/// Links application and runtime objects into the final executable
pub struct FinalLinker<'a> {
    config: &'a BuildConfig,
}

impl<'a> FinalLinker<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Run the single link invocation; returns `<work_dir>/out`.
    pub fn link(
        &self,
        unit_objects: &[PathBuf],
        runtime_objects: &[PathBuf],
        link_result: &LinkResult,
    ) -> BuildResult<PathBuf> {
        let out = self.config.work_dir.join(OUTPUT_FILE);
        let args = self.link_args(&out, unit_objects, runtime_objects, link_result);

        if self.config.verbose {
            println!(
                "Linking {} ({} objects)",
                out.display(),
                unit_objects.len() + runtime_objects.len()
            );
        }

        let output = run_tool(&self.config.clangpp, &args)?;
        if !output.success() {
            return Err(BuildError::LinkFailed(output.detail().to_string()));
        }
        Ok(out)
    }

    /// Assemble the full argument list: output flag, `-l` flags (platform,
    /// then reachable-code, then collector), extra link flags, target flag,
    /// then application objects followed by runtime objects.
    fn link_args(
        &self,
        out: &Path,
        unit_objects: &[PathBuf],
        runtime_objects: &[PathBuf],
        link_result: &LinkResult,
    ) -> Vec<String> {
        let mut libraries = platform_libraries(&self.config.target_triple);
        libraries.extend(link_result.links.iter().cloned());
        libraries.extend(
            self.config
                .gc
                .link_libraries()
                .iter()
                .map(|lib| lib.to_string()),
        );

        let mut args = vec!["-o".to_string(), out.display().to_string()];
        args.extend(libraries.into_iter().map(|lib| format!("-l{lib}")));
        args.extend(self.config.link_flags.iter().cloned());
        args.push("-target".to_string());
        args.push(self.config.target_triple.clone());
        args.extend(unit_objects.iter().map(|o| o.display().to_string()));
        args.extend(runtime_objects.iter().map(|o| o.display().to_string()));
        args
    }
}

/// Platform-conditional system libraries.
///
/// The unwinding library is linked everywhere except macOS; the realtime
/// library only on Linux.
pub fn platform_libraries(target_triple: &str) -> Vec<String> {
    let mut libraries = Vec::new();
    if target_triple.contains("linux") {
        libraries.push("rt".to_string());
    }
    let macos = target_triple.contains("darwin") || target_triple.contains("macos");
    if !macos {
        let arch = target_triple.split('-').next().unwrap_or_default();
        libraries.push("unwind".to_string());
        libraries.push(format!("unwind-{arch}"));
    }
    libraries
}
