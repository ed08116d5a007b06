use crate::cli::{extract_headless_args, has_list_flag, HeadlessArgs, RunCmd};
use crate::commands::list;
use crate::config::credentials::{is_authenticated, valid_credentials};
use crate::config::ConfigStore;
use crate::error::{MultiClaudeError, Result};
use crate::resolve::{resolve_installation, resolve_model, resolve_provider};
use crate::session::{
    agent_program, current_env, session_summary, SelectorCommand, SessionLauncher, Supervisor,
};
use crate::utils::terminal;

/// Default command: `--list`, headless launch with `--provider`, or the
/// interactive selector loop. Returns the process exit code.
pub fn execute(store: &ConfigStore, cmd: &RunCmd) -> Result<i32> {
    if has_list_flag(&cmd.args) {
        list::execute(store)?;
        return Ok(0);
    }

    match extract_headless_args(&cmd.args)? {
        Some(headless) => run_headless(store, &headless),
        None => {
            let supervisor = Supervisor::new(
                store.clone(),
                SelectorCommand::from_env()?,
                agent_program(),
                current_env(),
                cmd.args.clone(),
            );
            supervisor.run()
        }
    }
}

fn run_headless(store: &ConfigStore, args: &HeadlessArgs) -> Result<i32> {
    let config = store.load_migrated();
    if config.providers.is_empty() {
        return Err(MultiClaudeError::NoProviders);
    }

    let provider = resolve_provider(&args.provider, &config.providers)?;
    let choice = resolve_model(args.model.as_deref(), provider)?;
    if let Some(warning) = &choice.warning {
        eprintln!("{}", warning);
    }
    let installation = resolve_installation(args.installation.as_deref(), &config.installations)?;

    if provider.is_oauth() {
        if !is_authenticated(store.layout(), &provider.id) {
            return Err(MultiClaudeError::OAuthNotAuthenticated(provider.name.clone()));
        }
        if valid_credentials(store.layout(), &provider.id).is_none() {
            return Err(MultiClaudeError::OAuthExpired(provider.name.clone()));
        }
    }

    tracing::debug!(
        provider = %provider.name,
        model = %choice.model,
        installation = installation.id(),
        "headless launch"
    );

    let launcher = SessionLauncher::new(agent_program(), store.layout().clone(), current_env());
    let code = launcher.run(provider, &choice.model, &args.claude_args, &installation);
    terminal::reset_terminal();

    println!("{}", session_summary(provider, &choice.model, code));
    Ok(code)
}
