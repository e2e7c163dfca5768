//! Definition parsing and validation.
//!
//! Parses preset/recipe YAML and validates structural constraints before
//! anything executes:
//! - Exactly one step kind per action (scripts, copy, merge, recipe, prompt)
//! - `merge` has a `dst`; `dst` only appears on `merge`/`copy`
//! - Prompts have uniquely named options and a `default` naming one of them

use super::types::*;
use crate::error::{AutomateError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a definition file from disk.
pub fn parse_definition_file(path: &Path) -> Result<RawDefinition> {
    let content =
        std::fs::read_to_string(path).map_err(|e| AutomateError::io(path, e))?;
    parse_definition(&content, &path.display().to_string())
}

/// Parse a definition from a string. `source_name` only labels errors.
pub fn parse_definition(yaml: &str, source_name: &str) -> Result<RawDefinition> {
    if yaml.trim().is_empty() {
        return Ok(RawDefinition::default());
    }
    serde_yaml_ng::from_str(yaml).map_err(|e| AutomateError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Validate a parsed definition. Returns a list of errors (empty = valid).
pub fn validate_definition(raw: &RawDefinition) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    convert_groups(&raw.create, "create", &mut errors);
    convert_groups(&raw.preset, "preset", &mut errors);
    errors
}

/// Validate and convert a parsed definition into its executable form.
///
/// `id` becomes the definition's identity key; it is lower-cased here so
/// lookups can be case-insensitive.
pub fn build_definition(id: &str, kind: DefinitionKind, raw: RawDefinition) -> Result<PresetConfig> {
    let id = id.to_lowercase();
    let mut errors = Vec::new();
    let create = convert_groups(&raw.create, "create", &mut errors);
    let preset = convert_groups(&raw.preset, "preset", &mut errors);

    if !errors.is_empty() {
        return Err(AutomateError::Definition {
            id,
            errors: errors.into_iter().map(|e| e.message).collect(),
        });
    }

    let name = if raw.name.is_empty() {
        id.clone()
    } else {
        raw.name
    };
    Ok(PresetConfig::new(id, kind, name, raw.tags, create, preset))
}

fn convert_groups(
    groups: &[RawGroup],
    section: &str,
    errors: &mut Vec<ValidationError>,
) -> Vec<ActionGroup> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let location = format!("{}[{}]", section, i);
            ActionGroup {
                name: group.name.clone(),
                actions: convert_steps(&group.actions, &location, errors),
            }
        })
        .collect()
}

fn convert_steps(
    steps: &[RawStep],
    location: &str,
    errors: &mut Vec<ValidationError>,
) -> Vec<ActionStep> {
    steps
        .iter()
        .enumerate()
        .filter_map(|(i, step)| {
            let at = format!("{}.actions[{}]", location, i);
            convert_step(step, &at, errors)
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Step kind of a raw step, before its fields are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Scripts,
    Copy,
    Merge,
    Recipe,
    Prompt,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Scripts => "scripts",
            Kind::Copy => "copy",
            Kind::Merge => "merge",
            Kind::Recipe => "recipe",
            Kind::Prompt => "prompt",
        }
    }
}

/// Step kinds populated on a raw step.
fn populated_kinds(step: &RawStep) -> Vec<Kind> {
    let mut kinds = Vec::new();
    if step.scripts.as_ref().is_some_and(|s| !s.is_empty()) {
        kinds.push(Kind::Scripts);
    }
    if non_empty(&step.copy).is_some() {
        kinds.push(Kind::Copy);
    }
    if non_empty(&step.merge).is_some() {
        kinds.push(Kind::Merge);
    }
    if non_empty(&step.recipe).is_some() {
        kinds.push(Kind::Recipe);
    }
    if non_empty(&step.prompt).is_some() {
        kinds.push(Kind::Prompt);
    }
    kinds
}

fn convert_step(step: &RawStep, at: &str, errors: &mut Vec<ValidationError>) -> Option<ActionStep> {
    let kinds = populated_kinds(step);
    let kind = match kinds.as_slice() {
        [kind] => *kind,
        [] => {
            errors.push(ValidationError {
                message: format!(
                    "{}: no action set (expected one of scripts, copy, merge, recipe, prompt)",
                    at
                ),
            });
            return None;
        }
        many => {
            let names: Vec<&str> = many.iter().map(|k| k.name()).collect();
            errors.push(ValidationError {
                message: format!("{}: multiple actions set ({})", at, names.join(", ")),
            });
            return None;
        }
    };

    if step.dst.is_some() && !matches!(kind, Kind::Merge | Kind::Copy) {
        errors.push(ValidationError {
            message: format!("{}: 'dst' is not allowed on a {} action", at, kind.name()),
        });
    }
    if kind != Kind::Prompt && (step.default.is_some() || step.options.is_some()) {
        errors.push(ValidationError {
            message: format!("{}: 'default'/'options' are only allowed on a prompt", at),
        });
    }

    match kind {
        Kind::Scripts => {
            let lines = step.scripts.clone().unwrap_or_default();
            if lines.iter().any(|l| l.trim().is_empty()) {
                errors.push(ValidationError {
                    message: format!("{}: scripts contain an empty command", at),
                });
            }
            Some(ActionStep::Scripts(lines))
        }
        Kind::Copy => Some(ActionStep::Copy {
            source: non_empty(&step.copy)?.to_string(),
            dst: non_empty(&step.dst).map(str::to_string),
        }),
        Kind::Merge => {
            let source = non_empty(&step.merge)?.to_string();
            match non_empty(&step.dst) {
                Some(dst) => Some(ActionStep::Merge {
                    source,
                    dst: dst.to_string(),
                }),
                None => {
                    errors.push(ValidationError {
                        message: format!("{}: merge '{}' has no dst", at, source),
                    });
                    None
                }
            }
        }
        Kind::Recipe => Some(ActionStep::Recipe(non_empty(&step.recipe)?.to_string())),
        Kind::Prompt => convert_prompt(step, at, errors).map(ActionStep::Prompt),
    }
}

fn convert_prompt(step: &RawStep, at: &str, errors: &mut Vec<ValidationError>) -> Option<PromptStep> {
    let question = non_empty(&step.prompt)?.to_string();
    let raw_options = step.options.as_deref().unwrap_or_default();
    if raw_options.is_empty() {
        errors.push(ValidationError {
            message: format!("{}: prompt '{}' has no options", at, question),
        });
        return None;
    }

    let before = errors.len();
    let mut seen = HashSet::new();
    let mut options = Vec::with_capacity(raw_options.len());
    for (i, opt) in raw_options.iter().enumerate() {
        let name = opt.name.trim();
        if name.is_empty() {
            errors.push(ValidationError {
                message: format!("{}.options[{}]: option has no name", at, i),
            });
        } else if !seen.insert(name) {
            errors.push(ValidationError {
                message: format!("{}.options[{}]: duplicate option '{}'", at, i, name),
            });
        }
        let location = format!("{}.options[{}]", at, i);
        options.push(PromptOption {
            name: name.to_string(),
            actions: convert_steps(&opt.actions, &location, errors),
        });
    }

    let default = match non_empty(&step.default) {
        Some(d) if options.iter().any(|o| o.name == d) => d.to_string(),
        Some(d) => {
            errors.push(ValidationError {
                message: format!("{}: default '{}' is not one of the options", at, d),
            });
            return None;
        }
        None => options[0].name.clone(),
    };

    if errors.len() > before {
        return None;
    }
    Some(PromptStep {
        question,
        default,
        options,
    })
}

/// Every recipe name referenced by a step list, including inside prompt branches.
pub fn referenced_recipes(steps: &[ActionStep]) -> Vec<&str> {
    let mut names = Vec::new();
    for step in steps {
        match step {
            ActionStep::Recipe(name) => names.push(name.as_str()),
            ActionStep::Prompt(prompt) => {
                for option in &prompt.options {
                    names.extend(referenced_recipes(&option.actions));
                }
            }
            _ => {}
        }
    }
    names
}
