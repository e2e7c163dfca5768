//! Shell execution collaborator used by `scripts` steps.

pub mod local;

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::Path;

pub use local::LocalShell;

/// Runs one command line and reports its exit code.
///
/// A non-zero exit code is not an error at this level; the executor decides
/// what it means. `Err` is reserved for failing to run the command at all.
pub trait Shell {
    fn run_command(&self, cmd: &str, cwd: &Path, env: &BTreeMap<String, String>) -> Result<i32>;
}
