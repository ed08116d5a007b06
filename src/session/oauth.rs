//! OAuth login through the agent's own `login` subcommand.

use super::env::{EnvMap, CONFIG_DIR_VAR};
use super::handoff::OAuthLoginRequest;
use crate::config::credentials::is_authenticated;
use crate::config::ConfigStore;
use crate::error::{MultiClaudeError, Result};
use std::io;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    /// Login failed; a provider created for it has been removed
    FailedRemoved,
    /// Login failed; the existing provider was left alone
    Failed,
}

/// Run `<program> login` with the provider's account directory as the
/// agent config dir, inheriting stdio. Succeeds only when the agent exits 0
/// and a credential file now exists.
pub fn login(program: &str, store: &ConfigStore, base_env: &EnvMap, provider_id: &str) -> Result<bool> {
    let account_dir = store.layout().ensure_account_dir(provider_id)?;
    tracing::debug!(provider = provider_id, dir = %account_dir.display(), "starting agent login");

    let status = Command::new(program)
        .arg("login")
        .env_clear()
        .envs(base_env)
        .env(CONFIG_DIR_VAR, &account_dir)
        .status();

    let status = match status {
        Ok(status) => status,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("Error: {}", MultiClaudeError::ExecutableNotFound(program.to_string()));
            return Ok(false);
        }
        Err(e) => {
            eprintln!("Error: failed to start {} login: {}", program, e);
            return Ok(false);
        }
    };

    let authenticated = status.success() && is_authenticated(store.layout(), provider_id);
    tracing::debug!(code = ?status.code(), authenticated, "agent login finished");
    Ok(authenticated)
}

/// Carry out a login request from the selector. A failed first login
/// removes the provider record and its account directory.
pub fn handle_request(
    program: &str,
    store: &ConfigStore,
    base_env: &EnvMap,
    request: &OAuthLoginRequest,
) -> Result<LoginOutcome> {
    if login(program, store, base_env, &request.provider_id)? {
        println!("\n✓ Account \"{}\" authenticated.\n", request.provider_name);
        return Ok(LoginOutcome::Authenticated);
    }

    if request.is_new {
        store.remove_provider(&request.provider_id)?;
        // remove_provider only cleans up when the record still exists
        store.layout().remove_account_dir(&request.provider_id)?;
        eprintln!("\n✗ Authentication failed. The account was not added.\n");
        Ok(LoginOutcome::FailedRemoved)
    } else {
        eprintln!("\n✗ Re-authentication failed.\n");
        Ok(LoginOutcome::Failed)
    }
}
