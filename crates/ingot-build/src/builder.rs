//! Build orchestration: sequences the staged pipeline from linked IR to the
//! final native executable.
use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::ir::{IrPipeline, IrStages};
use crate::linker::FinalLinker;
use crate::runtime_lib::{collect_objects, RuntimeLibraryAssembler};
use crate::unit::UnitCompiler;

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Build statistics for one orchestrated build
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of application compilation units
    pub total_units: usize,
    /// Number of object files handed to the final link
    pub linked_objects: usize,
    /// Time spent in IR link/optimize/codegen
    pub ir_time: Duration,
    /// Time spent compiling units and runtime sources
    pub compilation_time: Duration,
    /// Time spent in the final link
    pub linking_time: Duration,
    /// Wall-clock time of the whole build
    pub total_time: Duration,
}

/// Main orchestrator.
///
/// Sequences IR link -> optimize -> codegen -> unit compilation (parallel) ->
/// runtime-library assembly (parallel, cache-checked) -> final link. Nothing
/// is cached across invocations except what lives on disk under the work
/// directory.
pub struct Builder<S: IrStages> {
    config: BuildConfig,
    stages: S,
    stats: BuildStats,
}

impl<S: IrStages> Builder<S> {
    pub fn new(config: BuildConfig, stages: S) -> Self {
        Self {
            config,
            stages,
            stats: BuildStats::default(),
        }
    }

    /// The configuration this builder runs with
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Statistics of the most recent [`Builder::link`] run
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Run the full pipeline; returns the path of the produced executable.
    pub fn link(&mut self) -> BuildResult<PathBuf> {
        let build_start = Instant::now();
        self.stats = BuildStats::default();

        fs::create_dir_all(&self.config.work_dir)
            .map_err(|e| BuildError::io(&self.config.work_dir, e))?;

        if self.config.verbose {
            println!(
                "Building {} for {} ({} mode, {} gc)",
                self.config.entry_point, self.config.target_triple, self.config.mode, self.config.gc
            );
        }

        // IR stages, strictly sequential; fails on unresolved symbols before
        // any native compilation starts.
        let ir_start = Instant::now();
        let mut pipeline = IrPipeline::new(&self.stages, &self.config);
        let link_result = pipeline.link()?.clone();
        pipeline.optimize()?;
        let units = pipeline.codegen()?.to_vec();
        self.stats.ir_time = ir_start.elapsed();
        self.stats.total_units = units.len();

        if self.config.verbose {
            println!(
                "IR stages done: {} reachable definitions, {} units",
                link_result.defns.len(),
                units.len()
            );
        }

        let compile_start = Instant::now();
        let unit_objects = UnitCompiler::new(&self.config).compile_all(&units)?;
        let lib_dir = RuntimeLibraryAssembler::new(&self.config).assemble(&link_result)?;
        let runtime_objects = collect_objects(&lib_dir);
        self.stats.compilation_time = compile_start.elapsed();
        self.stats.linked_objects = unit_objects.len() + runtime_objects.len();

        let link_start = Instant::now();
        let out = FinalLinker::new(&self.config).link(&unit_objects, &runtime_objects, &link_result)?;
        self.stats.linking_time = link_start.elapsed();
        self.stats.total_time = build_start.elapsed();

        if self.config.verbose {
            println!(
                "Build completed in {:.2}s: {}",
                self.stats.total_time.as_secs_f64(),
                out.display()
            );
        }

        Ok(out)
    }
}

/// Convenience entry point matching the orchestrator contract: discover a
/// configuration for the classpath, run the pipeline, return the executable.
pub fn link<S: IrStages>(
    stages: S,
    classpath: Vec<PathBuf>,
    work_dir: PathBuf,
    entry_point: impl Into<String>,
) -> BuildResult<PathBuf> {
    let config = BuildConfig::discover(classpath, work_dir, entry_point)?;
    Builder::new(config, stages).link()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GarbageCollector, Mode};
    use crate::ir::{LinkResult, OptimizedIr};
    use std::cell::Cell;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    struct StubStages {
        unresolved: Vec<String>,
        codegen_calls: Cell<usize>,
    }

    impl StubStages {
        fn new(unresolved: Vec<String>) -> Self {
            Self {
                unresolved,
                codegen_calls: Cell::new(0),
            }
        }
    }

    impl IrStages for StubStages {
        fn link(&self, _config: &BuildConfig) -> BuildResult<LinkResult> {
            Ok(LinkResult {
                defns: vec!["example.Main".to_string()],
                links: Vec::new(),
                unresolved: self.unresolved.clone(),
            })
        }

        fn optimize(&self, _config: &BuildConfig, linked: &LinkResult) -> BuildResult<OptimizedIr> {
            Ok(OptimizedIr {
                defns: linked.defns.clone(),
            })
        }

        fn codegen(&self, config: &BuildConfig, _optimized: &OptimizedIr) -> BuildResult<()> {
            self.codegen_calls.set(self.codegen_calls.get() + 1);
            fs::write(config.work_dir.join("main.ll"), "; ir\n").unwrap();
            Ok(())
        }
    }

    fn write_runtime_archive(dir: &Path) -> PathBuf {
        let path = dir.join("runtimelib.jar");
        let file = fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("core/rt.c", FileOptions::default())
            .unwrap();
        writer.write_all(b"int rt;\n").unwrap();
        writer.finish().unwrap();
        path
    }

    #[cfg(unix)]
    fn fake_toolchain(tmp: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let script = tmp.join("fake-cc");
        // Touches whatever path follows `-o`, covering compile and link modes.
        fs::write(
            &script,
            "#!/bin/sh\n\
             prev=''\n\
             for a in \"$@\"; do\n\
             if [ \"$prev\" = '-o' ]; then out=\"$a\"; fi\n\
             prev=\"$a\"\n\
             done\n\
             [ -n \"$out\" ] && touch \"$out\"\n\
             exit 0\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn test_config(tmp: &Path) -> BuildConfig {
        let compiler = fake_toolchain(tmp);
        BuildConfig {
            gc: GarbageCollector::Immix,
            mode: Mode::Debug,
            clang: compiler.clone(),
            clangpp: compiler,
            target_triple: "x86_64-unknown-linux-gnu".to_string(),
            compile_flags: Vec::new(),
            link_flags: Vec::new(),
            entry_point: "example.Main".to_string(),
            classpath: Vec::new(),
            work_dir: tmp.join("work"),
            runtime_archive: write_runtime_archive(tmp),
            verbose: false,
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_full_pipeline_produces_out() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let mut builder = Builder::new(config, StubStages::new(Vec::new()));

        let out = builder.link().unwrap();
        assert_eq!(out, tmp.path().join("work").join("out"));
        assert!(out.exists());
        assert_eq!(builder.stats().total_units, 1);
        assert_eq!(builder.stats().linked_objects, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_units_recompiled_every_build() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let stages = StubStages::new(Vec::new());
        let mut builder = Builder::new(config, stages);

        builder.link().unwrap();
        let object = tmp.path().join("work").join("main.ll.o");
        let first_mtime = fs::metadata(&object).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        builder.link().unwrap();
        let second_mtime = fs::metadata(&object).unwrap().modified().unwrap();
        assert!(second_mtime > first_mtime);
    }

    #[cfg(unix)]
    #[test]
    fn test_unresolved_symbols_stop_the_build() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let stages = StubStages::new(vec!["b.sym".to_string(), "a.sym".to_string()]);
        let mut builder = Builder::new(config, stages);

        let err = builder.link().unwrap_err();
        assert_eq!(err.to_string(), "unresolved symbols: a.sym, b.sym");
        // Codegen never ran and nothing was compiled.
        assert_eq!(builder.stages.codegen_calls.get(), 0);
        assert!(!tmp.path().join("work").join("main.ll.o").exists());
        assert!(!tmp.path().join("work").join("out").exists());
    }
}
