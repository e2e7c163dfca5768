//! Local execution via `sh -c`.

use super::Shell;
use crate::error::{AutomateError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs command lines through `sh -c` with stdio attached to the terminal,
/// so interactive tools started by a script (package managers, generators)
/// can talk to the user.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalShell {
    /// Discard the command's stdout/stderr instead of inheriting them.
    pub quiet: bool,
}

impl LocalShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Shell for LocalShell {
    fn run_command(&self, cmd: &str, cwd: &Path, env: &BTreeMap<String, String>) -> Result<i32> {
        let (stdout, stderr) = if self.quiet {
            (Stdio::null(), Stdio::null())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };

        let status = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .current_dir(cwd)
            .envs(env)
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .map_err(|e| AutomateError::Shell {
                command: cmd.to_string(),
                source: e,
            })?;

        // Killed by a signal: no exit code
        Ok(status.code().unwrap_or(-1))
    }
}
