//! Preset, recipe and action-step types.
//!
//! Two layers live here. The `Raw*` types mirror the YAML definition format
//! field-for-field and are what serde produces. The validated types
//! (`PresetConfig`, `ActionGroup`, `ActionStep`) are what the resolver hands
//! to the executor: every step is exactly one variant, checked by
//! [`parser`](super::parser) before anything runs.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Definition format (as written in YAML)
// ============================================================================

/// A preset or recipe file as it appears on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDefinition {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Labels used for filtering (e.g. language ecosystem)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Groups run when scaffolding a brand-new project
    #[serde(default)]
    pub create: Vec<RawGroup>,

    /// Groups run when applying to an existing project
    #[serde(default)]
    pub preset: Vec<RawGroup>,
}

/// A named batch of steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGroup {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub actions: Vec<RawStep>,
}

/// One step with every possible field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<String>,

    /// Destination for `merge` (required) or `copy` (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<RawOption>>,
}

/// A prompt choice and the steps it unlocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOption {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub actions: Vec<RawStep>,
}

// ============================================================================
// Validated model
// ============================================================================

/// Where a definition was registered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Preset,
    Recipe,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset => write!(f, "preset"),
            Self::Recipe => write!(f, "recipe"),
        }
    }
}

/// Which step list of a definition to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    /// Scaffold a new project.
    Create,
    /// Apply to the project in the working directory.
    Preset,
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Preset => write!(f, "preset"),
        }
    }
}

/// A named, taggable workflow definition (preset or recipe).
#[derive(Debug, Clone, PartialEq)]
pub struct PresetConfig {
    pub name: String,
    pub tags: Vec<String>,
    pub create: Vec<ActionGroup>,
    pub preset: Vec<ActionGroup>,

    id: String,
    kind: DefinitionKind,
}

impl PresetConfig {
    /// Build a definition. The id is fixed for the lifetime of the value.
    pub fn new(
        id: impl Into<String>,
        kind: DefinitionKind,
        name: impl Into<String>,
        tags: Vec<String>,
        create: Vec<ActionGroup>,
        preset: Vec<ActionGroup>,
    ) -> Self {
        Self {
            name: name.into(),
            tags,
            create,
            preset,
            id: id.into(),
            kind,
        }
    }

    /// Registry key: lower-cased, distinct from the display name.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// Exact, case-sensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The step list for a procedure.
    pub fn steps(&self, procedure: Procedure) -> &[ActionGroup] {
        match procedure {
            Procedure::Create => &self.create,
            Procedure::Preset => &self.preset,
        }
    }
}

/// A named, ordered batch of steps. Purely organizational.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionGroup {
    pub name: String,
    pub actions: Vec<ActionStep>,
}

/// One unit of work. Exactly one kind per step.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionStep {
    /// Shell command lines, each run as its own process.
    Scripts(Vec<String>),
    /// Copy a packaged template; `dst` defaults to the source file name.
    Copy { source: String, dst: Option<String> },
    /// Deep-merge a packaged YAML fragment into `dst`.
    Merge { source: String, dst: String },
    /// Expand another definition's `preset` steps in place.
    Recipe(String),
    /// Single-choice question with per-option steps.
    Prompt(PromptStep),
}

impl ActionStep {
    /// Short kind label for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scripts(_) => "scripts",
            Self::Copy { .. } => "copy",
            Self::Merge { .. } => "merge",
            Self::Recipe(_) => "recipe",
            Self::Prompt(_) => "prompt",
        }
    }
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scripts(lines) => write!(f, "scripts ({} line(s))", lines.len()),
            Self::Copy { source, dst } => match dst {
                Some(dst) => write!(f, "copy {} -> {}", source, dst),
                None => write!(f, "copy {}", source),
            },
            Self::Merge { source, dst } => write!(f, "merge {} -> {}", source, dst),
            Self::Recipe(name) => write!(f, "recipe {}", name),
            Self::Prompt(p) => write!(f, "prompt \"{}\"", p.question),
        }
    }
}

/// A prompt step after validation: `default` always names an option.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptStep {
    pub question: String,
    pub default: String,
    pub options: Vec<PromptOption>,
}

/// One choice of a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptOption {
    pub name: String,
    pub actions: Vec<ActionStep>,
}
