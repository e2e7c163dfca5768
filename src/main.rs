//! Kool CLI: scaffold and configure Docker-based projects from presets.

use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kool",
    version,
    about = "Scaffold projects and apply presets: scripts, templates and YAML merges"
)]
struct Cli {
    #[command(flatten)]
    global: kool::cli::GlobalArgs,

    #[command(subcommand)]
    command: kool::cli::Commands,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "kool=debug" } else { "kool=warn" };
    let filter = std::env::var("KOOL_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: cannot determine current directory: {}", e);
            std::process::exit(1);
        }
    };

    let result = kool::cli::Settings::from_args(
        &cli.global,
        std::io::stdin().is_terminal(),
        working_dir,
    )
    .and_then(|settings| {
        let mut session = kool::cli::Session::new(env!("CARGO_PKG_VERSION"));
        kool::cli::dispatch(cli.command, &settings, &mut session)
    });

    match result {
        Ok(()) => {}
        Err(e) if e.is_cancellation() => {
            eprintln!("Operation cancelled.");
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
