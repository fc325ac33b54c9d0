//! Ingot build pipeline
//!
//! Staged build orchestration from linked intermediate representation to a
//! native executable:
//! - Toolchain discovery (clang/clang++, target triple, llvm-config flags)
//! - Content-hash caching of the unpacked runtime-support archive
//! - Conditional runtime-library assembly (gc/optional source selection)
//! - Parallel compilation of generated compiler-intermediate files
//! - Platform-conditional final linking

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod ir;
pub mod linker;
pub mod process;
pub mod runtime_lib;
pub mod toolchain;
pub mod unit;

// Re-export main types
pub use builder::{link, BuildStats, Builder};
pub use config::{BuildConfig, GarbageCollector, Mode};
pub use error::{BuildError, BuildResult};
pub use ir::{CompilationUnit, DriverStages, IrPipeline, IrStages, LinkResult, OptimizedIr};
pub use linker::FinalLinker;
pub use process::{run_tool, ToolOutput};
pub use runtime_lib::{RuntimeLibraryAssembler, RuntimeSource, SourceKind};
pub use unit::UnitCompiler;
