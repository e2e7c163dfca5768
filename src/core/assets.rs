//! Built-in definitions and templates, plus the user override directory.
//!
//! Built-ins are compiled into the binary. An override directory mirrors the
//! same layout (`presets/`, `recipes/`, `templates/`) and wins on collisions.

use super::types::DefinitionKind;
use crate::error::{AutomateError, Result};
use std::path::{Component, Path, PathBuf};

/// A definition shipped with the binary.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinDefinition {
    pub id: &'static str,
    pub kind: DefinitionKind,
    pub yaml: &'static str,
}

macro_rules! definition {
    ($kind:ident, $dir:literal, $id:literal) => {
        BuiltinDefinition {
            id: $id,
            kind: DefinitionKind::$kind,
            yaml: include_str!(concat!("../../assets/", $dir, "/", $id, ".yml")),
        }
    };
}

macro_rules! template {
    ($name:literal) => {
        ($name, include_str!(concat!("../../assets/templates/", $name)))
    };
}

pub static BUILTIN_DEFINITIONS: &[BuiltinDefinition] = &[
    definition!(Preset, "presets", "adonis"),
    definition!(Preset, "presets", "laravel"),
    definition!(Preset, "presets", "nextjs"),
    definition!(Recipe, "recipes", "pick-cache"),
    definition!(Recipe, "recipes", "pick-db"),
    definition!(Recipe, "recipes", "pick-node-pkg-mgr"),
];

pub static BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    template!("app/laravel.yml"),
    template!("app/node-adonis.yml"),
    template!("app/node-nextjs.yml"),
    template!("cache/memcached.yml"),
    template!("cache/redis.yml"),
    template!("database/mysql.yml"),
    template!("database/postgresql.yml"),
    template!("laravel/.env.kool"),
    template!("scripts/laravel.yml"),
    template!("scripts/node-npm.yml"),
    template!("scripts/node-yarn.yml"),
];

/// A definition file found in the override directory.
#[derive(Debug, Clone)]
pub struct OverrideDefinition {
    pub id: String,
    pub kind: DefinitionKind,
    pub path: PathBuf,
}

/// Template and definition sources for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    overrides: Option<PathBuf>,
}

impl Assets {
    /// Built-ins only.
    pub fn builtin() -> Self {
        Self { overrides: None }
    }

    /// Built-ins plus a user directory that takes precedence.
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self {
            overrides: Some(dir.into()),
        }
    }

    /// Load a template by its relative name (e.g. `app/node-adonis.yml`).
    pub fn template(&self, name: &str) -> Result<String> {
        if !is_relative_inside(name) {
            return Err(AutomateError::TemplateNotFound {
                name: name.to_string(),
            });
        }

        if let Some(dir) = &self.overrides {
            let path = dir.join("templates").join(name);
            if path.is_file() {
                tracing::debug!(template = name, path = %path.display(), "using override template");
                return std::fs::read_to_string(&path).map_err(|e| AutomateError::io(&path, e));
            }
        }

        BUILTIN_TEMPLATES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, content)| content.to_string())
            .ok_or_else(|| AutomateError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    /// Definition files in the override directory, sorted by path.
    pub fn override_definitions(&self) -> Result<Vec<OverrideDefinition>> {
        let Some(dir) = &self.overrides else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for (sub, kind) in [
            ("presets", DefinitionKind::Preset),
            ("recipes", DefinitionKind::Recipe),
        ] {
            let path = dir.join(sub);
            if !path.is_dir() {
                continue;
            }
            let entries = std::fs::read_dir(&path).map_err(|e| AutomateError::io(&path, e))?;
            for entry in entries.flatten() {
                let file = entry.path();
                let is_yaml = matches!(
                    file.extension().and_then(|e| e.to_str()),
                    Some("yml") | Some("yaml")
                );
                if !is_yaml || !file.is_file() {
                    continue;
                }
                if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
                    found.push(OverrideDefinition {
                        id: stem.to_lowercase(),
                        kind,
                        path: file.clone(),
                    });
                }
            }
        }
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }
}

/// Relative path that cannot climb out of the template root.
fn is_relative_inside(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
