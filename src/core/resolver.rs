//! Preset/recipe resolution and recipe cycle detection.
//!
//! Definitions are registered by lower-cased id (built-ins first, then the
//! override directory, which replaces built-ins of the same id). Lookups are
//! case-insensitive. Recursive `recipe` expansion is guarded by an explicit
//! [`ResolutionStack`] rather than by call depth.

use super::assets::{Assets, BUILTIN_DEFINITIONS};
use super::parser;
use super::types::*;
use crate::error::{AutomateError, Result};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

/// Where a registered definition's YAML comes from.
#[derive(Debug, Clone)]
enum Source {
    Inline(&'static str),
    File(PathBuf),
}

#[derive(Debug, Clone)]
struct Entry {
    kind: DefinitionKind,
    source: Source,
}

/// Names currently being expanded, outermost first.
#[derive(Debug, Clone, Default)]
pub struct ResolutionStack {
    path: Vec<String>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id`, failing if it is already being expanded.
    pub fn enter(&mut self, id: &str) -> Result<()> {
        let id = id.to_lowercase();
        if self.path.contains(&id) {
            let mut path = self.path.clone();
            path.push(id);
            return Err(AutomateError::CyclicRecipe { path });
        }
        self.path.push(id);
        Ok(())
    }

    pub fn leave(&mut self) {
        self.path.pop();
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

fn builtin_entries() -> IndexMap<String, Entry> {
    let mut entries = IndexMap::new();
    for def in BUILTIN_DEFINITIONS {
        entries.insert(
            def.id.to_lowercase(),
            Entry {
                kind: def.kind,
                source: Source::Inline(def.yaml),
            },
        );
    }
    entries
}

/// Registry of every definition available to one invocation.
#[derive(Debug, Clone)]
pub struct Resolver {
    entries: IndexMap<String, Entry>,
    assets: Assets,
}

impl Resolver {
    /// Register built-ins plus any definitions in the assets' override directory.
    pub fn new(assets: Assets) -> Result<Self> {
        let mut entries = builtin_entries();
        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        for found in assets.override_definitions()? {
            if let Some(first) = claimed.get(&found.id) {
                return Err(AutomateError::Definition {
                    id: found.id.clone(),
                    errors: vec![format!(
                        "id defined by both {} and {}",
                        first.display(),
                        found.path.display()
                    )],
                });
            }
            claimed.insert(found.id.clone(), found.path.clone());
            if entries.contains_key(&found.id) {
                tracing::warn!(id = %found.id, path = %found.path.display(), "user definition overrides built-in");
            }
            entries.insert(
                found.id,
                Entry {
                    kind: found.kind,
                    source: Source::File(found.path),
                },
            );
        }

        Ok(Self { entries, assets })
    }

    /// Built-in definitions only.
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
            assets: Assets::builtin(),
        }
    }

    /// Register an in-memory definition, replacing any with the same id.
    pub fn insert_yaml(&mut self, id: &str, kind: DefinitionKind, yaml: &'static str) {
        self.entries.insert(
            id.to_lowercase(),
            Entry {
                kind,
                source: Source::Inline(yaml),
            },
        );
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Look up, parse and validate a definition by name (case-insensitive).
    pub fn resolve(&self, name: &str) -> Result<PresetConfig> {
        let id = name.trim().to_lowercase();
        let entry = self
            .entries
            .get(&id)
            .ok_or_else(|| AutomateError::NotFound {
                name: name.to_string(),
            })?;

        let raw = match &entry.source {
            Source::Inline(yaml) => parser::parse_definition(yaml, &id)?,
            Source::File(path) => parser::parse_definition_file(path)?,
        };
        parser::build_definition(&id, entry.kind, raw)
    }

    /// Resolve every recipe reachable from `groups` before anything runs.
    ///
    /// Surfaces missing recipes, invalid definitions and cycles (through any
    /// prompt branch, taken or not). `stack` should already hold the
    /// definition that owns `groups`, if any.
    pub fn preflight(&self, groups: &[ActionGroup], stack: &mut ResolutionStack) -> Result<()> {
        let mut verified = HashSet::new();
        for group in groups {
            self.preflight_steps(&group.actions, stack, &mut verified)?;
        }
        Ok(())
    }

    /// Preflight several procedures of one definition before any of them runs.
    ///
    /// Each procedure gets its own stack holding the definition's id.
    pub fn preflight_definition(&self, definition: &PresetConfig, procedures: &[Procedure]) -> Result<()> {
        for &procedure in procedures {
            let mut stack = ResolutionStack::new();
            stack.enter(definition.id())?;
            self.preflight(definition.steps(procedure), &mut stack)?;
        }
        Ok(())
    }

    fn preflight_steps(
        &self,
        steps: &[ActionStep],
        stack: &mut ResolutionStack,
        verified: &mut HashSet<String>,
    ) -> Result<()> {
        for name in parser::referenced_recipes(steps) {
            let recipe = self.resolve(name)?;
            stack.enter(recipe.id())?;
            if !verified.contains(recipe.id()) {
                for group in &recipe.preset {
                    self.preflight_steps(&group.actions, stack, verified)?;
                }
                verified.insert(recipe.id().to_string());
            }
            stack.leave();
        }
        Ok(())
    }

    /// Resolved definitions of `kind` (all kinds if `None`) carrying `tag`, sorted by id.
    pub fn list(&self, kind: Option<DefinitionKind>, tag: Option<&str>) -> Result<Vec<PresetConfig>> {
        let mut ids: Vec<&String> = self
            .entries
            .iter()
            .filter(|(_, e)| kind.is_none_or(|k| e.kind == k))
            .map(|(id, _)| id)
            .collect();
        ids.sort();

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let config = self.resolve(id)?;
            if tag.is_none_or(|t| config.has_tag(t)) {
                out.push(config);
            }
        }
        Ok(out)
    }

    /// Sorted, de-duplicated tags across all presets.
    pub fn preset_tags(&self) -> Result<Vec<String>> {
        let tags: BTreeSet<String> = self
            .list(Some(DefinitionKind::Preset), None)?
            .into_iter()
            .flat_map(|p| p.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }
}
