//! Toolchain discovery: compiler location, target-triple probing, and
//! llvm-config queries.
//!
//! Environment variables are read here and only here; the results are frozen
//! into [`crate::config::BuildConfig`] before the pipeline starts.
use crate::error::{BuildError, BuildResult};
use crate::process::run_tool;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Candidate (major, minor) suffixes tried when searching `PATH` for a
/// versioned compiler, newest first.
pub const CLANG_VERSIONS: &[(&str, &str)] = &[
    ("6", "0"),
    ("5", "0"),
    ("4", "0"),
    ("3", "9"),
    ("3", "8"),
    ("3", "7"),
];

/// Subdirectory of the work directory used for the target-triple probe
pub const PROBE_DIR: &str = "target";

const TRIPLE_MARKER: &str = "target triple = \"";

/// Locate a compiler binary.
///
/// Resolution order: the `<NAME>_PATH` environment variable (uppercased base
/// name, non-alphanumerics stripped), used verbatim when set; otherwise the
/// first `PATH` hit among `name<major><minor>`, `name-<major>.<minor>` for
/// each candidate version, and finally the bare name.
pub fn discover(base_name: &str, versions: &[(&str, &str)]) -> BuildResult<PathBuf> {
    if let Ok(path) = env::var(env_var_name(base_name)) {
        return Ok(PathBuf::from(path));
    }

    let candidates = candidate_names(base_name, versions);
    candidates
        .iter()
        .find_map(|name| find_in_path(name))
        .ok_or_else(|| BuildError::toolchain_not_found(base_name, &candidates))
}

/// Environment override variable for a binary: `clang` -> `CLANG_PATH`,
/// `clang++` -> `CLANGPP_PATH`.
pub fn env_var_name(base_name: &str) -> String {
    let mut name: String = base_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_uppercase();
    name.push_str("_PATH");
    name
}

/// All binary names tried for a base name, in search order
fn candidate_names(base_name: &str, versions: &[(&str, &str)]) -> Vec<String> {
    let mut names = Vec::with_capacity(versions.len() * 2 + 1);
    for (major, minor) in versions {
        names.push(format!("{base_name}{major}{minor}"));
        names.push(format!("{base_name}-{major}.{minor}"));
    }
    names.push(base_name.to_string());
    names
}

/// Search the execution `PATH` for a binary
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Detect the target triple by compiling a one-line probe source.
///
/// Writes `<work_dir>/target/probe.c`, asks the C compiler to emit textual IR
/// for it, and extracts the quoted triple from the first `target triple` line.
pub fn detect_target_triple(clang: &Path, work_dir: &Path) -> BuildResult<String> {
    let probe_dir = work_dir.join(PROBE_DIR);
    fs::create_dir_all(&probe_dir).map_err(|e| BuildError::io(&probe_dir, e))?;

    let probe_c = probe_dir.join("probe.c");
    let probe_ll = probe_dir.join("probe.ll");
    fs::write(&probe_c, "int probe;\n").map_err(|e| BuildError::io(&probe_c, e))?;

    let args = vec![
        "-S".to_string(),
        "-emit-llvm".to_string(),
        probe_c.display().to_string(),
        "-o".to_string(),
        probe_ll.display().to_string(),
    ];
    let output = run_tool(clang, &args)?;
    if !output.success() {
        return Err(BuildError::ToolchainProbeFailed(format!(
            "probe compilation exited with status {}: {}",
            output.status,
            output.detail()
        )));
    }

    let emitted = fs::read_to_string(&probe_ll).map_err(|e| BuildError::io(&probe_ll, e))?;
    parse_target_triple(&emitted).ok_or_else(|| {
        BuildError::ToolchainProbeFailed("no target triple line in probe output".to_string())
    })
}

/// Extract the quoted triple from emitted IR text
fn parse_target_triple(emitted: &str) -> Option<String> {
    emitted
        .lines()
        .find_map(|line| line.strip_prefix(TRIPLE_MARKER))
        .and_then(|rest| rest.split('"').next())
        .map(str::to_string)
}

/// `-I` flags from `llvm-config --includedir`; empty on any failure
pub fn include_flags() -> Vec<String> {
    llvm_config("--includedir")
        .into_iter()
        .map(|dir| format!("-I{dir}"))
        .collect()
}

/// `-L` flags from `llvm-config --libdir`; empty on any failure
pub fn lib_flags() -> Vec<String> {
    llvm_config("--libdir")
        .into_iter()
        .map(|dir| format!("-L{dir}"))
        .collect()
}

/// Query llvm-config, degrading to an empty list when the binary is missing
/// or exits non-zero.
fn llvm_config(flag: &str) -> Vec<String> {
    let binary = env::var(env_var_name("llvm-config"))
        .map(PathBuf::from)
        .ok()
        .or_else(|| find_in_path("llvm-config"));

    let Some(binary) = binary else {
        return Vec::new();
    };

    match run_tool(&binary, &[flag.to_string()]) {
        Ok(output) if output.success() => output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("clang"), "CLANG_PATH");
        assert_eq!(env_var_name("clang++"), "CLANGPP_PATH");
        assert_eq!(env_var_name("llvm-config"), "LLVMCONFIG_PATH");
    }

    #[test]
    fn test_candidate_names_order() {
        let names = candidate_names("clang", &[("3", "9"), ("3", "8")]);
        assert_eq!(names, vec!["clang39", "clang-3.9", "clang38", "clang-3.8", "clang"]);
    }

    #[test]
    fn test_discover_env_override_used_verbatim() {
        // The override is taken without existence checks.
        std::env::set_var("INGOTPROBETOOL_PATH", "/opt/custom/ingotprobetool");
        let found = discover("ingotprobetool", CLANG_VERSIONS).unwrap();
        assert_eq!(found, PathBuf::from("/opt/custom/ingotprobetool"));
        std::env::remove_var("INGOTPROBETOOL_PATH");
    }

    #[test]
    fn test_discover_falls_back_to_path_search() {
        // `sh` exists unversioned on any unix PATH.
        let found = discover("sh", &[("9", "9")]).unwrap();
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn test_discover_not_found_lists_all_candidates() {
        let err = discover("ingot-nonexistent-cc", &[("3", "9")]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ingot-nonexistent-cc39"));
        assert!(message.contains("ingot-nonexistent-cc-3.9"));
        assert!(message.contains("ingot-nonexistent-cc"));
    }

    #[test]
    fn test_parse_target_triple() {
        let emitted = "; ModuleID = 'probe.c'\n\
                       source_filename = \"probe.c\"\n\
                       target datalayout = \"e-m:e-i64:64-f80:128-n8:16:32:64-S128\"\n\
                       target triple = \"x86_64-unknown-linux-gnu\"\n\
                       \n\
                       @probe = global i32 0\n";
        assert_eq!(
            parse_target_triple(emitted),
            Some("x86_64-unknown-linux-gnu".to_string())
        );
    }

    #[test]
    fn test_parse_target_triple_missing() {
        assert_eq!(parse_target_triple("; no triple here\n"), None);
    }

    #[test]
    fn test_probe_failure_reports_status() {
        let tmp = TempDir::new().unwrap();
        // `false` accepts the arguments and exits 1.
        let err = detect_target_triple(&PathBuf::from("false"), tmp.path()).unwrap_err();
        assert!(matches!(err, BuildError::ToolchainProbeFailed(_)));
    }
}
