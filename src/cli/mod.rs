//! CLI subcommands: create, preset, recipe, list, validate.

use crate::core::context::{ExecutionContext, CREATE_DIRECTORY};
use crate::core::executor::{self, Executor, RunReport};
use crate::core::prompt::{self, InquirePrompter, Prompter};
use crate::core::resolver::Resolver;
use crate::core::{assets::Assets, parser, types::*};
use crate::error::{AutomateError, Result};
use crate::transport::{LocalShell, Shell};
use clap::{Args, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Directory with user presets/, recipes/ and templates/ overriding the built-ins
    #[arg(long, global = true, env = "KOOL_PRESETS_DIR")]
    pub presets_dir: Option<PathBuf>,

    /// Never prompt; every question takes its default answer
    #[arg(long, global = true, env = "KOOL_NO_INTERACTION")]
    pub no_interaction: bool,

    /// Extra environment variable for scripts (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", global = true)]
    pub vars: Vec<String>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new project from a preset, then apply the preset inside it
    Create {
        /// Preset name (e.g. laravel)
        preset: String,

        /// Directory to create the project in
        directory: String,
    },

    /// Apply a preset to the current directory
    Preset {
        /// Preset name; asks for one when omitted
        name: Option<String>,
    },

    /// Apply a single recipe to the current directory
    Recipe {
        /// Recipe name (e.g. pick-db)
        name: String,
    },

    /// List available presets (or recipes)
    List {
        /// Only definitions carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// List recipes instead of presets
        #[arg(long)]
        recipes: bool,
    },

    /// Validate a preset or recipe file without running anything
    Validate {
        /// Path to the definition file
        file: PathBuf,
    },
}

/// Startup configuration, decided once from flags, env and the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub presets_dir: Option<PathBuf>,
    pub interactive: bool,
    pub vars: BTreeMap<String, String>,
    pub working_dir: PathBuf,
}

impl Settings {
    pub fn from_args(args: &GlobalArgs, stdin_is_terminal: bool, working_dir: PathBuf) -> Result<Self> {
        let mut vars = BTreeMap::new();
        for pair in &args.vars {
            let (key, value) = parse_var(pair)?;
            vars.insert(key, value);
        }
        Ok(Self {
            presets_dir: args.presets_dir.clone(),
            interactive: stdin_is_terminal && !args.no_interaction,
            vars,
            working_dir,
        })
    }

    fn context(&self) -> ExecutionContext {
        ExecutionContext::new(&self.working_dir)
            .interactive(self.interactive)
            .with_vars(self.vars.clone())
    }

    fn assets(&self) -> Assets {
        match &self.presets_dir {
            Some(dir) => Assets::with_overrides(dir),
            None => Assets::builtin(),
        }
    }
}

/// Split `KEY=VALUE`. The value may itself contain `=`.
fn parse_var(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(AutomateError::usage(format!(
            "invalid --var '{}': expected KEY=VALUE",
            pair
        ))),
    }
}

/// Notices shown at most once per process.
#[derive(Debug)]
pub struct Session {
    version: &'static str,
    banner_shown: bool,
}

impl Session {
    pub fn new(version: &'static str) -> Self {
        Self {
            version,
            banner_shown: false,
        }
    }

    /// Pre-release builds announce themselves on the first call only.
    pub fn dev_banner(&mut self) -> Option<String> {
        if self.banner_shown || !self.version.contains('-') {
            return None;
        }
        self.banner_shown = true;
        Some(format!(
            "Running development version {} of kool; presets may change without notice.",
            self.version
        ))
    }
}

/// Collaborators a command runs against.
pub struct Runtime<'a> {
    pub resolver: &'a Resolver,
    pub shell: &'a dyn Shell,
    pub prompter: &'a dyn Prompter,
}

impl Runtime<'_> {
    fn executor(&self) -> Executor<'_> {
        Executor::new(self.resolver, self.shell, self.prompter)
    }
}

/// Dispatch a CLI command against the real shell and terminal.
pub fn dispatch(cmd: Commands, settings: &Settings, session: &mut Session) -> Result<()> {
    let resolver = Resolver::new(settings.assets())?;
    let shell = LocalShell::new();
    let prompter = InquirePrompter;
    let rt = Runtime {
        resolver: &resolver,
        shell: &shell,
        prompter: &prompter,
    };
    run(cmd, settings, session, &rt)
}

/// Dispatch with explicit collaborators.
pub fn run(cmd: Commands, settings: &Settings, session: &mut Session, rt: &Runtime<'_>) -> Result<()> {
    if let Some(banner) = session.dev_banner() {
        eprintln!("{}", banner);
    }
    match cmd {
        Commands::Create { preset, directory } => cmd_create(rt, settings, &preset, &directory),
        Commands::Preset { name } => cmd_preset(rt, settings, name.as_deref()),
        Commands::Recipe { name } => cmd_recipe(rt, settings, &name),
        Commands::List { tag, recipes } => cmd_list(rt, tag.as_deref(), recipes),
        Commands::Validate { file } => cmd_validate(rt, &file),
    }
}

fn resolve_kind(rt: &Runtime<'_>, name: &str, kind: DefinitionKind) -> Result<PresetConfig> {
    let def = rt.resolver.resolve(name)?;
    if def.kind() != kind {
        return Err(AutomateError::usage(format!(
            "'{}' is a {}, not a {}",
            def.id(),
            def.kind(),
            kind
        )));
    }
    Ok(def)
}

fn cmd_create(rt: &Runtime<'_>, settings: &Settings, preset: &str, directory: &str) -> Result<()> {
    let def = resolve_kind(rt, preset, DefinitionKind::Preset)?;
    let ctx = settings.context().with_var(CREATE_DIRECTORY, directory);
    let exec = rt.executor();

    // Both halves are checked before the create scripts touch anything.
    rt.resolver
        .preflight_definition(&def, &[Procedure::Create, Procedure::Preset])?;

    println!("Creating {} project in {}", def.name, directory);
    let created = exec.run_definition(&def, Procedure::Create, &ctx)?;

    let target = ctx.resolve_path(directory);
    std::fs::create_dir_all(&target).map_err(|e| AutomateError::io(&target, e))?;
    let applied = exec.run_definition(&def, Procedure::Preset, &ctx.in_directory(&target))?;

    print_report(&executor::combine(&[created, applied]));
    Ok(())
}

fn cmd_preset(rt: &Runtime<'_>, settings: &Settings, name: Option<&str>) -> Result<()> {
    let def = match name {
        Some(name) => resolve_kind(rt, name, DefinitionKind::Preset)?,
        None => pick_preset(rt, settings.interactive)?,
    };
    println!("Applying preset {}", def.name);
    let report = rt
        .executor()
        .run_definition(&def, Procedure::Preset, &settings.context())?;
    print_report(&report);
    Ok(())
}

/// Ask for a tag, then for a preset carrying it.
fn pick_preset(rt: &Runtime<'_>, interactive: bool) -> Result<PresetConfig> {
    if !interactive {
        return Err(AutomateError::usage(
            "no preset given and prompts are disabled; pass a preset name",
        ));
    }

    let tags = rt.resolver.preset_tags()?;
    if tags.is_empty() {
        return Err(AutomateError::usage("no presets available"));
    }
    let tag = prompt::choose(rt.prompter, "What type of project are you working on?", &tags)?;

    let presets = rt.resolver.list(Some(DefinitionKind::Preset), Some(tag))?;
    let names: Vec<String> = presets.iter().map(|p| p.name.clone()).collect();
    let chosen = prompt::choose(rt.prompter, "Which preset do you want to use?", &names)?;

    presets
        .into_iter()
        .find(|p| p.name == chosen)
        .ok_or_else(|| AutomateError::Prompt(format!("unknown preset '{}'", chosen)))
}

fn cmd_recipe(rt: &Runtime<'_>, settings: &Settings, name: &str) -> Result<()> {
    let def = resolve_kind(rt, name, DefinitionKind::Recipe)?;
    println!("Applying recipe {}", def.name);
    let report = rt
        .executor()
        .run_definition(&def, Procedure::Preset, &settings.context())?;
    print_report(&report);
    Ok(())
}

fn cmd_list(rt: &Runtime<'_>, tag: Option<&str>, recipes: bool) -> Result<()> {
    let kind = if recipes {
        DefinitionKind::Recipe
    } else {
        DefinitionKind::Preset
    };
    for line in list_lines(rt.resolver, kind, tag)? {
        println!("{}", line);
    }
    Ok(())
}

fn list_lines(resolver: &Resolver, kind: DefinitionKind, tag: Option<&str>) -> Result<Vec<String>> {
    Ok(resolver
        .list(Some(kind), tag)?
        .iter()
        .map(|d| format!("{:<20} {:<24} [{}]", d.id(), d.name, d.tags.join(", ")))
        .collect())
}

fn cmd_validate(rt: &Runtime<'_>, file: &Path) -> Result<()> {
    let id = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("definition");
    let raw = parser::parse_definition_file(file)?;

    let errors = parser::validate_definition(&raw);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        return Err(AutomateError::Definition {
            id: id.to_lowercase(),
            errors: errors.into_iter().map(|e| e.message).collect(),
        });
    }
    let def = parser::build_definition(id, DefinitionKind::Preset, raw)?;

    // Referenced recipes must exist and be acyclic.
    rt.resolver
        .preflight_definition(&def, &[Procedure::Create, Procedure::Preset])?;

    println!(
        "OK: {} ({} create groups, {} preset groups)",
        def.name,
        def.create.len(),
        def.preset.len()
    );
    Ok(())
}

fn print_report(report: &RunReport) {
    println!(
        "Done: {} scripts run, {} files copied, {} files merged, {} recipes, {} prompts.",
        report.scripts_run,
        report.files_copied,
        report.files_merged,
        report.recipes_expanded,
        report.prompts_answered
    );
}
