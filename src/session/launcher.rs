//! Spawning the agent with a synthesized environment.

use super::env::{build_env, EnvMap};
use crate::config::{InstallationTarget, Layout, Provider};
use crate::error::MultiClaudeError;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Overrides the agent executable.
pub const AGENT_BIN_ENV: &str = "MCLAUDE_CLAUDE_BIN";
pub const DEFAULT_AGENT_BIN: &str = "claude";

/// Agent executable named by `MCLAUDE_CLAUDE_BIN`, `claude` otherwise.
pub fn agent_program() -> String {
    std::env::var(AGENT_BIN_ENV)
        .ok()
        .filter(|bin| !bin.is_empty())
        .unwrap_or_else(|| DEFAULT_AGENT_BIN.to_string())
}

/// One agent session: what to run and where its state lives.
#[derive(Debug, Clone)]
pub struct SessionLauncher {
    program: String,
    layout: Layout,
    base_env: EnvMap,
}

impl SessionLauncher {
    pub fn new(program: impl Into<String>, layout: Layout, base_env: EnvMap) -> Self {
        Self {
            program: program.into(),
            layout,
            base_env,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the agent until it exits and return the code to exit with.
    ///
    /// Blocks for the whole interactive session. An unknown template or a
    /// missing executable is reported on stderr and yields 1; a child killed
    /// by a signal also yields 1.
    pub fn run(
        &self,
        provider: &Provider,
        model: &str,
        extra_args: &[String],
        installation: &InstallationTarget,
    ) -> i32 {
        let Some(env) = build_env(&self.base_env, provider, model, installation, &self.layout) else {
            eprintln!(
                "Error: {}",
                MultiClaudeError::TemplateMissing(provider.template_id.clone())
            );
            return 1;
        };

        let args = build_args(provider, model, extra_args);
        let program = self.resolve_program();

        tracing::debug!(program = %program.display(), ?args, "spawning agent");
        tracing::debug!(
            vars = ?env
                .keys()
                .filter(|k| k.starts_with("ANTHROPIC") || k.starts_with("CLAUDE"))
                .collect::<Vec<_>>(),
            installation = installation.id(),
            "agent environment"
        );

        let status = Command::new(&program)
            .args(&args)
            .env_clear()
            .envs(&env)
            .status();

        match status {
            Ok(status) => {
                tracing::debug!(code = ?status.code(), "agent exited");
                status.code().unwrap_or(1)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(error = %e, "agent executable not found");
                eprintln!(
                    "Error: {}",
                    MultiClaudeError::ExecutableNotFound(self.program.clone())
                );
                1
            }
            Err(e) => {
                tracing::warn!(error = %e, "agent failed to start");
                eprintln!("Error: failed to start {}: {}", self.program, e);
                1
            }
        }
    }

    /// Absolute path of the agent when it can be found, the bare name
    /// otherwise. Only used for logging.
    fn resolve_program(&self) -> PathBuf {
        which::which(&self.program).unwrap_or_else(|_| PathBuf::from(&self.program))
    }
}

/// `--model <model>` for API providers, then the forwarded arguments minus
/// any model flag the user passed (it was consumed when resolving).
pub fn build_args(provider: &Provider, model: &str, extra_args: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(extra_args.len() + 2);
    if !provider.is_oauth() {
        args.push("--model".to_string());
        args.push(model.to_string());
    }

    let mut rest = extra_args.iter();
    while let Some(arg) = rest.next() {
        if arg == "--model" || arg == "-m" {
            rest.next();
            continue;
        }
        if arg.starts_with("--model=") {
            continue;
        }
        args.push(arg.clone());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn provider(kind: ProviderKind, template: &str) -> Provider {
        Provider {
            id: "p1".to_string(),
            name: "Test".to_string(),
            template_id: template.to_string(),
            kind,
            api_key: "k".to_string(),
            models: vec![],
            base_url: None,
        }
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_build_args_prepends_model_and_filters_flags() {
        let p = provider(ProviderKind::Api, "deepseek");
        let args = build_args(
            &p,
            "deepseek-chat",
            &strings(&["-p", "hi", "--model", "x", "-m", "y", "--model=z", "--verbose"]),
        );
        assert_eq!(args, strings(&["--model", "deepseek-chat", "-p", "hi", "--verbose"]));
    }

    #[test]
    fn test_build_args_oauth_has_no_model() {
        let p = provider(ProviderKind::Oauth, "anthropic");
        let args = build_args(&p, "", &strings(&["--continue"]));
        assert_eq!(args, strings(&["--continue"]));
    }

    #[test]
    fn test_trailing_model_flag_dropped() {
        let p = provider(ProviderKind::Oauth, "anthropic");
        assert!(build_args(&p, "", &strings(&["--model"])).is_empty());
    }

    #[test]
    fn test_unknown_template_exits_1() {
        let tmp = TempDir::new().unwrap();
        let launcher = SessionLauncher::new("true", Layout::new(tmp.path()), EnvMap::new());
        let code = launcher.run(
            &provider(ProviderKind::Api, "gone"),
            "m",
            &[],
            &InstallationTarget::Default,
        );
        assert_eq!(code, 1);
    }

    #[test]
    fn test_missing_executable_exits_1() {
        let tmp = TempDir::new().unwrap();
        let launcher = SessionLauncher::new(
            tmp.path().join("no-such-agent").to_string_lossy().into_owned(),
            Layout::new(tmp.path()),
            EnvMap::new(),
        );
        let code = launcher.run(
            &provider(ProviderKind::Api, "deepseek"),
            "deepseek-chat",
            &[],
            &InstallationTarget::Default,
        );
        assert_eq!(code, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_is_forwarded() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("agent");
        std::fs::write(
            &script,
            "#!/bin/sh\n[ \"$1\" = \"--model\" ] || exit 9\n[ -n \"$ANTHROPIC_AUTH_TOKEN\" ] || exit 8\nexit 7\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let launcher = SessionLauncher::new(
            script.to_string_lossy().into_owned(),
            Layout::new(tmp.path()),
            EnvMap::new(),
        );
        let code = launcher.run(
            &provider(ProviderKind::Api, "deepseek"),
            "deepseek-chat",
            &[],
            &InstallationTarget::Default,
        );
        assert_eq!(code, 7);
    }
}
