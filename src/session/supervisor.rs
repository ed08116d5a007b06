//! The interactive control loop.
//!
//! The selector runs as a separate process so a crash in it can never take
//! the launcher down with it. The supervisor waits for each child to exit
//! before it looks at any shared file, so the two never touch the config
//! store at the same time.

use super::env::EnvMap;
use super::handoff::{
    self, OAuthLoginRequest, SelectionPayload, SelectorExit, PROTOCOL_ENV, PROTOCOL_VERSION,
    SELECTION_FILE_ENV,
};
use super::launcher::SessionLauncher;
use super::oauth;
use crate::config::{ConfigStore, InstallationTarget, Provider};
use crate::error::{MultiClaudeError, Result};
use crate::utils::terminal;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Overrides the selector program (defaults to `mclaude __select`).
pub const SELECTOR_ENV: &str = "MCLAUDE_SELECTOR";
pub const SELECT_SUBCOMMAND: &str = "__select";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorState {
    SelectingInteractively,
    AwaitingOAuthHandoff,
    Launching,
    Done(i32),
}

/// How to start the selector process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl SelectorCommand {
    /// `MCLAUDE_SELECTOR` when set, this executable's hidden selector
    /// subcommand otherwise.
    pub fn from_env() -> Result<Self> {
        if let Some(program) = std::env::var_os(SELECTOR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self {
                program: PathBuf::from(program),
                args: Vec::new(),
            });
        }
        Ok(Self {
            program: std::env::current_exe()?,
            args: vec![SELECT_SUBCOMMAND.to_string()],
        })
    }
}

pub struct Supervisor {
    store: ConfigStore,
    selector: SelectorCommand,
    agent_program: String,
    base_env: EnvMap,
    /// Forwarded to the agent on launch
    extra_args: Vec<String>,
}

impl Supervisor {
    pub fn new(
        store: ConfigStore,
        selector: SelectorCommand,
        agent_program: impl Into<String>,
        base_env: EnvMap,
        extra_args: Vec<String>,
    ) -> Self {
        Self {
            store,
            selector,
            agent_program: agent_program.into(),
            base_env,
            extra_args,
        }
    }

    /// Drive the loop to completion and return the process exit code.
    pub fn run(&self) -> Result<i32> {
        let mut state = SupervisorState::SelectingInteractively;
        loop {
            tracing::debug!(?state, "supervisor state");
            state = match state {
                SupervisorState::SelectingInteractively => self.select()?,
                SupervisorState::AwaitingOAuthHandoff => self.oauth_handoff()?,
                SupervisorState::Launching => self.launch()?,
                SupervisorState::Done(code) => return Ok(code),
            };
        }
    }

    fn selection_file(&self) -> PathBuf {
        self.store.layout().selection_file()
    }

    fn select(&self) -> Result<SupervisorState> {
        let selection_file = self.selection_file();
        fs::create_dir_all(self.store.layout().root())?;
        // A leftover from an interrupted run must not be mistaken for a fresh one
        if selection_file.exists() {
            fs::remove_file(&selection_file)?;
        }

        tracing::debug!(program = %self.selector.program.display(), "spawning selector");
        let status = Command::new(&self.selector.program)
            .args(&self.selector.args)
            .env(PROTOCOL_ENV, PROTOCOL_VERSION.to_string())
            .env(SELECTION_FILE_ENV, &selection_file)
            .status()
            .map_err(|e| {
                MultiClaudeError::Handoff(format!(
                    "failed to start selector {}: {}",
                    self.selector.program.display(),
                    e
                ))
            })?;

        let exit = SelectorExit::from_code(status.code().unwrap_or(1));
        tracing::debug!(?exit, "selector exited");

        Ok(match exit {
            SelectorExit::Launch => SupervisorState::Launching,
            SelectorExit::Restart => SupervisorState::SelectingInteractively,
            SelectorExit::OAuthRequest => SupervisorState::AwaitingOAuthHandoff,
            SelectorExit::Final(code) => SupervisorState::Done(code),
        })
    }

    fn oauth_handoff(&self) -> Result<SupervisorState> {
        let request: OAuthLoginRequest = handoff::take(&self.selection_file())?;
        tracing::debug!(provider = %request.provider_name, is_new = request.is_new, "oauth login requested");

        terminal::reset_terminal();
        let outcome = oauth::handle_request(&self.agent_program, &self.store, &self.base_env, &request)?;
        tracing::debug!(?outcome, "oauth login handled");

        Ok(SupervisorState::SelectingInteractively)
    }

    fn launch(&self) -> Result<SupervisorState> {
        let payload: SelectionPayload = handoff::take(&self.selection_file())?;
        let provider = payload.provider();
        let model = payload.model();

        if model.is_empty() && !provider.is_oauth() {
            tracing::debug!(provider = %provider.name, "no model in selection");
            eprintln!("No model selected. Add models to this provider with 'mclaude models add'.");
            return Ok(SupervisorState::Done(1));
        }

        let config = self.store.load_migrated();
        let installation =
            InstallationTarget::from_id(payload.installation_id.as_deref(), &config.installations);

        terminal::reset_terminal();
        let launcher = SessionLauncher::new(
            self.agent_program.clone(),
            self.store.layout().clone(),
            self.base_env.clone(),
        );
        let code = launcher.run(&provider, model, &self.extra_args, &installation);
        terminal::reset_terminal();

        println!("{}", session_summary(&provider, model, code));
        Ok(SupervisorState::Done(code))
    }
}

/// `\n[mclaude] <provider> (<model>) — session ended`, the model omitted for
/// OAuth providers.
pub fn session_summary(provider: &Provider, model: &str, code: i32) -> String {
    let info = if provider.is_oauth() {
        provider.name.clone()
    } else {
        format!("{} ({})", provider.name, model)
    };
    if code == 0 {
        format!("\n[mclaude] {} — session ended", info)
    } else {
        format!("\n[mclaude] {} — exited with code {}", info, code)
    }
}
