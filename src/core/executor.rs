//! Executor: the sequential step loop.
//!
//! Walks groups in order and steps within each group in order:
//! preflight (resolve every reachable recipe) → for each step: dispatch by kind.
//! The first failure aborts the whole run, including enclosing recipes and
//! prompt branches. Nothing already written is rolled back.

use super::context::ExecutionContext;
use super::merge;
use super::prompt::{self, Prompter};
use super::resolver::{ResolutionStack, Resolver};
use super::types::*;
use crate::error::{AutomateError, Result};
use crate::transport::Shell;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub scripts_run: u32,
    pub files_copied: u32,
    pub files_merged: u32,
    pub recipes_expanded: u32,
    pub prompts_answered: u32,
}

impl RunReport {
    fn absorb(&mut self, other: &RunReport) {
        self.scripts_run += other.scripts_run;
        self.files_copied += other.files_copied;
        self.files_merged += other.files_merged;
        self.recipes_expanded += other.recipes_expanded;
        self.prompts_answered += other.prompts_answered;
    }
}

/// Orchestrates resolution, prompting, merging and script execution.
pub struct Executor<'a> {
    resolver: &'a Resolver,
    shell: &'a dyn Shell,
    prompter: &'a dyn Prompter,
}

/// Mutable state of one top-level run.
struct RunState {
    stack: ResolutionStack,
    report: RunReport,
}

impl<'a> Executor<'a> {
    pub fn new(resolver: &'a Resolver, shell: &'a dyn Shell, prompter: &'a dyn Prompter) -> Self {
        Self {
            resolver,
            shell,
            prompter,
        }
    }

    /// Run a list of groups that belongs to no particular definition.
    pub fn run(&self, groups: &[ActionGroup], ctx: &ExecutionContext) -> Result<RunReport> {
        self.run_from(ResolutionStack::new(), groups, ctx)
    }

    /// Run one procedure of a definition, with the definition itself on the
    /// cycle-guard stack so recipes cannot re-enter it.
    pub fn run_definition(
        &self,
        definition: &PresetConfig,
        procedure: Procedure,
        ctx: &ExecutionContext,
    ) -> Result<RunReport> {
        tracing::info!(id = definition.id(), %procedure, dir = %ctx.working_dir.display(), "running definition");
        let mut stack = ResolutionStack::new();
        stack.enter(definition.id())?;
        self.run_from(stack, definition.steps(procedure), ctx)
    }

    fn run_from(
        &self,
        mut stack: ResolutionStack,
        groups: &[ActionGroup],
        ctx: &ExecutionContext,
    ) -> Result<RunReport> {
        let start = Instant::now();
        self.resolver.preflight(groups, &mut stack)?;

        let mut state = RunState {
            stack,
            report: RunReport::default(),
        };
        self.run_groups(groups, ctx, &mut state)?;

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            report = ?state.report,
            "run complete"
        );
        Ok(state.report)
    }

    fn run_groups(&self, groups: &[ActionGroup], ctx: &ExecutionContext, state: &mut RunState) -> Result<()> {
        for group in groups {
            tracing::info!(group = %group.name, depth = state.stack.depth(), "action group");
            self.run_steps(&group.actions, ctx, state)?;
        }
        Ok(())
    }

    fn run_steps(&self, steps: &[ActionStep], ctx: &ExecutionContext, state: &mut RunState) -> Result<()> {
        for step in steps {
            tracing::debug!(kind = step.kind(), step = %step, "step");
            self.run_step(step, ctx, state)?;
        }
        Ok(())
    }

    fn run_step(&self, step: &ActionStep, ctx: &ExecutionContext, state: &mut RunState) -> Result<()> {
        match step {
            ActionStep::Scripts(lines) => {
                for line in lines {
                    self.run_script(line, ctx)?;
                    state.report.scripts_run += 1;
                }
            }
            ActionStep::Copy { source, dst } => {
                let target = match dst {
                    Some(dst) => dst.as_str(),
                    None => default_copy_target(source),
                };
                let content = self.resolver.assets().template(source)?;
                write_file(&ctx.resolve_path(target), &content)?;
                state.report.files_copied += 1;
            }
            ActionStep::Merge { source, dst } => {
                self.merge_into(source, &ctx.resolve_path(dst))?;
                state.report.files_merged += 1;
            }
            ActionStep::Recipe(name) => {
                let recipe = self.resolver.resolve(name)?;
                state.stack.enter(recipe.id())?;
                tracing::info!(recipe = recipe.id(), path = ?state.stack.path(), "expanding recipe");
                self.run_groups(&recipe.preset, ctx, state)?;
                state.stack.leave();
                state.report.recipes_expanded += 1;
            }
            ActionStep::Prompt(p) => {
                let chosen = prompt::ask(self.prompter, ctx.interactive, &p.question, &p.options, &p.default)?;
                tracing::info!(question = %p.question, answer = %chosen.name, "prompt answered");
                state.report.prompts_answered += 1;
                self.run_steps(&chosen.actions, ctx, state)?;
            }
        }
        Ok(())
    }

    fn run_script(&self, line: &str, ctx: &ExecutionContext) -> Result<()> {
        tracing::info!(command = line, "running script");
        let exit_code = self.shell.run_command(line, &ctx.working_dir, &ctx.vars)?;
        if exit_code != 0 {
            return Err(AutomateError::ScriptFailure {
                command: line.to_string(),
                exit_code,
            });
        }
        Ok(())
    }

    /// Merge template `source` into the document at `dst`.
    ///
    /// An absent or empty destination receives the template bytes verbatim.
    fn merge_into(&self, source: &str, dst: &Path) -> Result<()> {
        let overlay_text = self.resolver.assets().template(source)?;
        let overlay = merge::parse_document(&overlay_text).map_err(|e| AutomateError::MergeParse {
            path: PathBuf::from(source),
            message: e.to_string(),
        })?;

        let base = match std::fs::read_to_string(dst) {
            Ok(text) => merge::parse_document(&text).map_err(|e| AutomateError::MergeParse {
                path: dst.to_path_buf(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => serde_yaml_ng::Value::Null,
            Err(e) => return Err(AutomateError::io(dst, e)),
        };

        if base.is_null() {
            return write_file(dst, &overlay_text);
        }
        if overlay.is_null() {
            return Ok(());
        }

        let merged = merge::merge(base, overlay).map_err(|c| AutomateError::MergeTypeConflict {
            dst: dst.to_path_buf(),
            base: c.base,
            overlay: c.overlay,
        })?;
        let rendered = merge::render_document(&merged).map_err(|e| AutomateError::MergeParse {
            path: dst.to_path_buf(),
            message: e.to_string(),
        })?;
        write_file(dst, &rendered)
    }
}

/// File name of a template path (`laravel/.env.kool` → `.env.kool`).
fn default_copy_target(source: &str) -> &str {
    Path::new(source)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(source)
}

/// Write `content` to `path`, creating parent directories. Overwrites.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| AutomateError::io(parent, e))?;
        }
    }
    std::fs::write(path, content).map_err(|e| AutomateError::io(path, e))
}

/// Sum of several reports (e.g. `create` followed by `preset`).
pub fn combine(reports: &[RunReport]) -> RunReport {
    let mut total = RunReport::default();
    for r in reports {
        total.absorb(r);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::Assets;
    use crate::core::context::CREATE_DIRECTORY;
    use crate::core::prompt::testing::ScriptedPrompter;
    use crate::transport::testing::RecordingShell;

    struct Fixture {
        project: tempfile::TempDir,
        overrides: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                project: tempfile::tempdir().unwrap(),
                overrides: tempfile::tempdir().unwrap(),
            }
        }

        fn template(&self, name: &str, content: &str) {
            let path = self.overrides.path().join("templates").join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn resolver(&self, defs: &[(&str, DefinitionKind, &'static str)]) -> Resolver {
            let mut r = Resolver::new(Assets::with_overrides(self.overrides.path())).unwrap();
            for (id, kind, yaml) in defs {
                r.insert_yaml(id, *kind, yaml);
            }
            r
        }

        fn ctx(&self) -> ExecutionContext {
            ExecutionContext::new(self.project.path())
        }

        fn read(&self, name: &str) -> String {
            std::fs::read_to_string(self.project.path().join(name)).unwrap()
        }

        fn exists(&self, name: &str) -> bool {
            self.project.path().join(name).exists()
        }
    }

    fn groups(yaml: &str) -> Vec<ActionGroup> {
        let raw = crate::core::parser::parse_definition(yaml, "inline").unwrap();
        crate::core::parser::build_definition("inline", DefinitionKind::Preset, raw)
            .unwrap()
            .preset
    }

    #[test]
    fn test_merge_into_empty_destination_is_verbatim() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[(
            "adonis-test",
            DefinitionKind::Preset,
            "tags: [JS]\npreset:\n  - name: compose\n    actions:\n      - merge: app/node-adonis.yml\n        dst: docker-compose.yml\n",
        )]);
        std::fs::write(fx.project.path().join("docker-compose.yml"), "").unwrap();

        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);
        let preset = resolver.resolve("adonis-test").unwrap();
        let report = exec.run_definition(&preset, Procedure::Preset, &fx.ctx()).unwrap();

        let expected = resolver.assets().template("app/node-adonis.yml").unwrap();
        assert_eq!(fx.read("docker-compose.yml"), expected);
        assert_eq!(report.files_merged, 1);
    }

    #[test]
    fn test_non_interactive_prompt_runs_default_branch_only() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: scripts\n    actions:\n      - recipe: pick-node-pkg-mgr\n");
        let report = exec.run(&steps, &fx.ctx()).unwrap();

        let npm = resolver.assets().template("scripts/node-npm.yml").unwrap();
        assert_eq!(fx.read("kool.yml"), npm);
        assert!(!fx.read("kool.yml").contains("yarn"));
        assert!(prompter.asked.borrow().is_empty());
        assert_eq!(report.prompts_answered, 1);
        assert_eq!(report.recipes_expanded, 1);
    }

    #[test]
    fn test_interactive_prompt_runs_chosen_branch() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[Some(1)]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: scripts\n    actions:\n      - recipe: pick-node-pkg-mgr\n");
        exec.run(&steps, &fx.ctx().interactive(true)).unwrap();

        assert!(fx.read("kool.yml").contains("yarn install"));
        assert!(!fx.read("kool.yml").contains("npm install"));
    }

    #[test]
    fn test_sequential_merges_union_disjoint_keys() {
        let fx = Fixture::new();
        fx.template("part/services.yml", "services:\n  app:\n    image: app\n");
        fx.template("part/volumes.yml", "volumes:\n  data: {}\n");
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups(
            r#"
preset:
  - name: compose
    actions:
      - merge: part/services.yml
        dst: docker-compose.yml
      - merge: part/volumes.yml
        dst: docker-compose.yml
"#,
        );
        exec.run(&steps, &fx.ctx()).unwrap();

        let doc = merge::parse_document(&fx.read("docker-compose.yml")).unwrap();
        let expected =
            merge::parse_document("services:\n  app:\n    image: app\nvolumes:\n  data: {}\n").unwrap();
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_merge_keeps_user_customizations() {
        let fx = Fixture::new();
        std::fs::write(
            fx.project.path().join("docker-compose.yml"),
            "services:\n  app:\n    image: mine\n  worker:\n    image: custom-worker\n",
        )
        .unwrap();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups(
            "preset:\n  - name: db\n    actions:\n      - merge: database/mysql.yml\n        dst: docker-compose.yml\n",
        );
        exec.run(&steps, &fx.ctx()).unwrap();

        let compose = fx.read("docker-compose.yml");
        assert!(compose.contains("custom-worker"));
        assert!(compose.contains("image: mine"));
        assert!(compose.contains("mysql/mysql-server"));
    }

    #[test]
    fn test_merge_type_conflict() {
        let fx = Fixture::new();
        fx.template("list.yml", "- a\n- b\n");
        std::fs::write(fx.project.path().join("kool.yml"), "scripts: {}\n").unwrap();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: g\n    actions:\n      - merge: list.yml\n        dst: kool.yml\n");
        let err = exec.run(&steps, &fx.ctx()).unwrap_err();
        assert!(matches!(
            err,
            AutomateError::MergeTypeConflict { base: "mapping", overlay: "sequence", .. }
        ));
        assert_eq!(fx.read("kool.yml"), "scripts: {}\n");
    }

    #[test]
    fn test_merge_invalid_destination() {
        let fx = Fixture::new();
        std::fs::write(fx.project.path().join("kool.yml"), "scripts: [unclosed\n").unwrap();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups(
            "preset:\n  - name: g\n    actions:\n      - merge: scripts/node-npm.yml\n        dst: kool.yml\n",
        );
        let err = exec.run(&steps, &fx.ctx()).unwrap_err();
        assert!(matches!(err, AutomateError::MergeParse { .. }));
    }

    #[test]
    fn test_script_failure_aborts_everything_after() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::failing("step two", 3);
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups(
            r#"
preset:
  - name: first
    actions:
      - scripts: ["step one", "step two", "step three"]
      - merge: cache/redis.yml
        dst: docker-compose.yml
  - name: second
    actions:
      - scripts: ["step four"]
"#,
        );
        let err = exec.run(&steps, &fx.ctx()).unwrap_err();
        match err {
            AutomateError::ScriptFailure { command, exit_code } => {
                assert_eq!(command, "step two");
                assert_eq!(exit_code, 3);
            }
            other => panic!("expected script failure, got {:?}", other),
        }
        assert_eq!(shell.commands(), vec!["step one", "step two"]);
        assert!(!fx.exists("docker-compose.yml"));
    }

    #[test]
    fn test_failure_inside_recipe_aborts_enclosing_groups() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[(
            "breaks",
            DefinitionKind::Recipe,
            "preset:\n  - name: g\n    actions:\n      - scripts: [boom]\n      - scripts: [after-boom]\n",
        )]);
        let shell = RecordingShell::failing("boom", 1);
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups(
            "preset:\n  - name: a\n    actions:\n      - recipe: breaks\n      - scripts: [outer]\n  - name: b\n    actions:\n      - scripts: [later]\n",
        );
        let err = exec.run(&steps, &fx.ctx()).unwrap_err();
        assert!(matches!(err, AutomateError::ScriptFailure { .. }));
        assert_eq!(shell.commands(), vec!["boom"]);
    }

    #[test]
    fn test_cycle_detected_before_side_effects() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[
            ("one", DefinitionKind::Recipe, "preset:\n  - name: g\n    actions:\n      - recipe: two\n"),
            ("two", DefinitionKind::Recipe, "preset:\n  - name: g\n    actions:\n      - recipe: one\n"),
        ]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: g\n    actions:\n      - scripts: [first]\n      - recipe: one\n");
        let err = exec.run(&steps, &fx.ctx()).unwrap_err();
        match err {
            AutomateError::CyclicRecipe { path } => assert_eq!(path, vec!["one", "two", "one"]),
            other => panic!("expected cycle, got {:?}", other),
        }
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn test_recipe_cannot_reenter_running_definition() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[(
            "selfish",
            DefinitionKind::Preset,
            "preset:\n  - name: g\n    actions:\n      - recipe: SELFISH\n",
        )]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let def = resolver.resolve("selfish").unwrap();
        let err = exec.run_definition(&def, Procedure::Preset, &fx.ctx()).unwrap_err();
        assert!(matches!(err, AutomateError::CyclicRecipe { .. }));
    }

    #[test]
    fn test_missing_recipe_detected_before_side_effects() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: g\n    actions:\n      - scripts: [first]\n      - recipe: nowhere\n");
        let err = exec.run(&steps, &fx.ctx()).unwrap_err();
        assert!(matches!(err, AutomateError::NotFound { .. }));
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn test_same_recipe_twice_in_sequence_is_not_a_cycle() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[(
            "hello",
            DefinitionKind::Recipe,
            "preset:\n  - name: g\n    actions:\n      - scripts: [hello]\n",
        )]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: g\n    actions:\n      - recipe: hello\n      - recipe: hello\n");
        let report = exec.run(&steps, &fx.ctx()).unwrap();
        assert_eq!(shell.commands(), vec!["hello", "hello"]);
        assert_eq!(report.recipes_expanded, 2);
    }

    #[test]
    fn test_cancelled_prompt_stops_run_unwrapped() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[None]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups(
            "preset:\n  - name: g\n    actions:\n      - recipe: pick-db\n      - scripts: [after]\n",
        );
        let err = exec.run(&steps, &fx.ctx().interactive(true)).unwrap_err();
        assert!(matches!(err, AutomateError::UserCancelled));
        assert!(shell.commands().is_empty());
        assert!(!fx.exists("docker-compose.yml"));
    }

    #[test]
    fn test_scripts_receive_context() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: g\n    actions:\n      - scripts: [\"npx create-app $CREATE_DIRECTORY\"]\n");
        let ctx = fx.ctx().with_var(CREATE_DIRECTORY, "my-app").with_var("VERBOSE", "1");
        exec.run(&steps, &ctx).unwrap();

        let calls = shell.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].cmd, "npx create-app $CREATE_DIRECTORY");
        assert_eq!(calls[0].cwd, fx.project.path());
        assert_eq!(calls[0].env[CREATE_DIRECTORY], "my-app");
        assert_eq!(calls[0].env["VERBOSE"], "1");
    }

    #[test]
    fn test_copy_default_target_and_overwrite() {
        let fx = Fixture::new();
        std::fs::write(fx.project.path().join(".env.kool"), "stale").unwrap();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: g\n    actions:\n      - copy: laravel/.env.kool\n");
        let report = exec.run(&steps, &fx.ctx()).unwrap();

        let expected = resolver.assets().template("laravel/.env.kool").unwrap();
        assert_eq!(fx.read(".env.kool"), expected);
        assert_eq!(report.files_copied, 1);
    }

    #[test]
    fn test_copy_with_dst_creates_parents() {
        let fx = Fixture::new();
        fx.template("docker/nginx.conf", "server {}\n");
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups(
            "preset:\n  - name: g\n    actions:\n      - copy: docker/nginx.conf\n        dst: deploy/nginx/default.conf\n",
        );
        exec.run(&steps, &fx.ctx()).unwrap();
        assert_eq!(fx.read("deploy/nginx/default.conf"), "server {}\n");
    }

    #[test]
    fn test_copy_missing_template() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let steps = groups("preset:\n  - name: g\n    actions:\n      - copy: nope/missing.txt\n");
        let err = exec.run(&steps, &fx.ctx()).unwrap_err();
        assert!(matches!(err, AutomateError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_create_procedure() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let adonis = resolver.resolve("adonis").unwrap();
        let ctx = fx.ctx().with_var(CREATE_DIRECTORY, "my-app");
        let report = exec.run_definition(&adonis, Procedure::Create, &ctx).unwrap();
        assert_eq!(report.scripts_run, 1);
        assert!(shell.commands()[0].contains("create-adonis-ts-app"));
        assert!(!fx.exists("docker-compose.yml"));
    }

    #[test]
    fn test_full_builtin_preset_non_interactive() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);

        let laravel = resolver.resolve("laravel").unwrap();
        let report = exec.run_definition(&laravel, Procedure::Preset, &fx.ctx()).unwrap();

        let compose = fx.read("docker-compose.yml");
        assert!(compose.contains("kooldev/php"));
        assert!(compose.contains("mysql/mysql-server"));
        assert!(compose.contains("redis"));
        let kool = fx.read("kool.yml");
        assert!(kool.contains("artisan"));
        assert!(kool.contains("npm"));
        assert!(fx.exists(".env.kool"));
        assert_eq!(report.prompts_answered, 3);
        assert_eq!(report.recipes_expanded, 3);
    }

    #[test]
    fn test_repeated_preset_is_idempotent() {
        let fx = Fixture::new();
        let resolver = fx.resolver(&[]);
        let shell = RecordingShell::default();
        let prompter = ScriptedPrompter::new(&[]);
        let exec = Executor::new(&resolver, &shell, &prompter);
        let adonis = resolver.resolve("adonis").unwrap();

        exec.run_definition(&adonis, Procedure::Preset, &fx.ctx()).unwrap();
        let first = merge::parse_document(&fx.read("docker-compose.yml")).unwrap();
        exec.run_definition(&adonis, Procedure::Preset, &fx.ctx()).unwrap();
        let second = merge::parse_document(&fx.read("docker-compose.yml")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_combine_reports() {
        let a = RunReport {
            scripts_run: 1,
            files_merged: 2,
            ..Default::default()
        };
        let b = RunReport {
            scripts_run: 2,
            prompts_answered: 1,
            ..Default::default()
        };
        let total = combine(&[a, b]);
        assert_eq!(total.scripts_run, 3);
        assert_eq!(total.files_merged, 2);
        assert_eq!(total.prompts_answered, 1);
    }

    #[test]
    fn test_default_copy_target() {
        assert_eq!(default_copy_target("laravel/.env.kool"), ".env.kool");
        assert_eq!(default_copy_target("kool.yml"), "kool.yml");
    }
}
