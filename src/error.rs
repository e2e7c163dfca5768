//! Error taxonomy for resolution, validation and execution.
//!
//! Every failure propagates unchanged from the step that raised it up to the
//! command layer. `UserCancelled` is the one variant the binary does not treat
//! as a tool failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the automation engine.
#[derive(Error, Debug)]
pub enum AutomateError {
    /// No preset or recipe is registered under the requested name.
    #[error("preset or recipe '{name}' not found")]
    NotFound { name: String },

    /// A definition parsed but broke one or more structural rules.
    #[error("invalid definition '{id}':\n  {}", errors.join("\n  "))]
    Definition { id: String, errors: Vec<String> },

    /// A definition could not be parsed as YAML.
    #[error("cannot parse definition {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// A recipe transitively invoked itself.
    #[error("recipe cycle detected: {}", path.join(" -> "))]
    CyclicRecipe { path: Vec<String> },

    /// A script line exited non-zero.
    #[error("command '{command}' failed with exit code {exit_code}")]
    ScriptFailure { command: String, exit_code: i32 },

    /// A script line could not be started at all.
    #[error("cannot run '{command}': {source}")]
    Shell {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Merge overlay and destination disagree on the document's top-level type.
    #[error("cannot merge a {overlay} into {dst} which holds a {base}")]
    MergeTypeConflict {
        dst: PathBuf,
        base: &'static str,
        overlay: &'static str,
    },

    /// A merge source or destination is not valid YAML.
    #[error("invalid YAML in {path}: {message}")]
    MergeParse { path: PathBuf, message: String },

    /// A `copy` or `merge` source is neither in the overrides nor built in.
    #[error("template '{name}' not found")]
    TemplateNotFound { name: String },

    /// Filesystem failure while reading or writing a file.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The interactive input collaborator failed (not a cancellation).
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// The user interrupted an interactive prompt.
    #[error("operation cancelled by user")]
    UserCancelled,

    /// Command-layer usage problems (bad `--var`, nothing to pick from, ...).
    #[error("{0}")]
    Usage(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AutomateError>;

impl AutomateError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// True when the run ended because the user cancelled a prompt.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}
