#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use multi_claude::cli::{router, Cli, Commands};
use multi_claude::commands;
use multi_claude::config::{ConfigStore, Layout};
use multi_claude::utils::{logging, terminal};

fn main() {
    // Route arguments so that launching Claude Code is the default command
    let args = std::env::args_os();
    let routed_args = router::route_args(args);
    let cli = Cli::parse_from(routed_args);

    terminal::install_panic_hook();
    let guard = terminal::TerminalGuard::new();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            1
        }
    };

    tracing::debug!(code, "exiting");
    // process::exit skips destructors
    drop(guard);
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let layout = Layout::from_env();
    logging::init(&layout.logs_dir());
    tracing::debug!(args = ?std::env::args().collect::<Vec<_>>(), version = multi_claude::version::VERSION, "started");

    let store = ConfigStore::new(layout);

    match &cli.command {
        Some(Commands::Run(cmd)) => return Ok(commands::run::execute(&store, cmd)?),
        Some(Commands::Select) => return Ok(commands::select::execute(&store)?),
        Some(Commands::Providers { command }) => commands::providers::execute(&store, command)?,
        Some(Commands::Models { command }) => commands::models::execute(&store, command)?,
        Some(Commands::Installations { command }) => {
            commands::installations::execute(&store, command)?
        }
        Some(Commands::Templates) => commands::templates::execute()?,
        Some(Commands::Reset { yes }) => commands::reset::execute(&store, *yes)?,
        None => {
            // Router should always insert a subcommand; this is a safety net
            anyhow::bail!("no command after routing. Run 'mclaude --help' for usage.");
        }
    }

    Ok(0)
}
