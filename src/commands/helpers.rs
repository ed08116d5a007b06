use crate::config::{Config, Installation, Provider};
use crate::error::{MultiClaudeError, Result};
use crate::resolve;
use std::io::{self, Write};

/// Ask a `[y/N]` question on stdout. Anything but `y`/`yes` is a no,
/// including EOF.
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Resolve a provider the same way `--provider` does, failing early when
/// nothing is configured.
pub fn find_provider(config: &Config, input: &str) -> Result<Provider> {
    if config.providers.is_empty() {
        return Err(MultiClaudeError::NoProviders);
    }
    resolve::resolve_provider(input, &config.providers).cloned()
}

/// Resolve a managed installation. `default` is not stored and so can't be
/// renamed or removed.
pub fn find_installation(config: &Config, input: &str) -> Result<Installation> {
    resolve::resolve_installation(Some(input), &config.installations)?
        .dir_name()
        .and_then(|dir_name| {
            config
                .installations
                .iter()
                .find(|i| i.dir_name == dir_name || i.id == dir_name)
        })
        .cloned()
        .ok_or_else(|| {
            MultiClaudeError::InvalidArgs(
                "The default installation is managed by Claude Code and can't be changed."
                    .to_string(),
            )
        })
}

/// Single-threaded runtime for the few network calls a command makes.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
