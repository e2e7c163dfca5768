//! Per-run execution context threaded through every step.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the target directory of `create`.
pub const CREATE_DIRECTORY: &str = "CREATE_DIRECTORY";

/// Variables and flags for one workflow run.
///
/// Nothing here is read from process-wide state during execution; the
/// command layer decides every value once, up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Directory scripts run in and relative destinations resolve against.
    pub working_dir: PathBuf,

    /// Whether prompts may ask the user; otherwise defaults are taken.
    pub interactive: bool,

    /// Exported to every script as environment variables.
    pub vars: BTreeMap<String, String>,
}

impl ExecutionContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            interactive: false,
            vars: BTreeMap::new(),
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.vars.extend(vars);
        self
    }

    /// Same variables and flags, different working directory.
    pub fn in_directory(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: dir.into(),
            ..self.clone()
        }
    }

    /// Resolve a step path against the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.working_dir.join(p)
        }
    }
}
