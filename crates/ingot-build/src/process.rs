//! Uniform external-tool invocation.
//!
//! Every pipeline stage that spawns a subprocess goes through [`run_tool`],
//! which blocks until the child exits and returns a structured result. Stages
//! wrap failures in their own error kinds; this module never decides fatality.
use crate::error::{BuildError, BuildResult};

use std::path::Path;
use std::process::Command;

/// Captured result of one external tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code; -1 when the process was killed by a signal
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stderr if non-empty, otherwise stdout; for error reporting
    pub fn detail(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }
}

/// Run an external tool to completion, capturing its output.
///
/// Spawn failures (missing binary, permission) surface as I/O errors naming
/// the program; a non-zero exit is NOT an error here — callers decide.
pub fn run_tool(program: &Path, args: &[String]) -> BuildResult<ToolOutput> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| BuildError::io(program, e))?;

    Ok(ToolOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
