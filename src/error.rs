use std::path::PathBuf;
use thiserror::Error;

/// Failure classes for remote model listing and API key validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    #[error("the API key was rejected")]
    Auth,

    #[error("the endpoint could not be reached")]
    Network,

    #[error("the endpoint returned an unexpected response")]
    Unknown,
}

#[derive(Error, Debug)]
pub enum MultiClaudeError {
    #[error("Multiple providers match \"{input}\":\n{}\n\nUse the exact provider name: --provider \"Provider Name\"", format_candidates(.candidates))]
    AmbiguousProvider {
        input: String,
        candidates: Vec<(String, String)>,
    },

    #[error("Provider \"{input}\" not found.\n\nAvailable providers:\n{}\n\nRun mclaude without --provider to manage providers interactively.", format_candidates(.available))]
    ProviderNotFound {
        input: String,
        available: Vec<(String, String)>,
    },

    #[error("No providers configured.\nRun mclaude without --provider, or 'mclaude providers add', to add one.")]
    NoProviders,

    #[error("No models configured for \"{0}\".\nAdd models with 'mclaude models add' or specify: --model <model-name>")]
    NoModels(String),

    #[error("Installation \"{input}\" not found.\n\nAvailable installations:\n{}", format_names(.available))]
    InstallationNotFound {
        input: String,
        available: Vec<String>,
    },

    #[error("Template \"{0}\" not found.")]
    TemplateMissing(String),

    #[error("\"{0}\" not found in PATH.\n\nInstall Claude Code:\n  macOS/Linux/WSL:  curl -fsSL https://claude.ai/install.sh | bash\n  Windows:          irm https://claude.ai/install.ps1 | iex\n  Homebrew:         brew install --cask claude-code")]
    ExecutableNotFound(String),

    #[error("OAuth provider \"{0}\" is not authenticated.\nRun mclaude without --provider to authenticate.")]
    OAuthNotAuthenticated(String),

    #[error("OAuth token for \"{0}\" has expired.\nRun mclaude without --provider to re-authenticate.")]
    OAuthExpired(String),

    #[error("{0}")]
    InvalidArgs(String),

    #[error("Selection handoff failed: {0}")]
    Handoff(String),

    #[error("Failed to read handoff file {path}: {source}")]
    HandoffRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_candidates(entries: &[(String, String)]) -> String {
    if entries.is_empty() {
        return "  (none configured)".to_string();
    }
    entries
        .iter()
        .map(|(name, template)| format!("  - \"{}\" ({})", name, template))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_names(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("  - \"{}\"", name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, MultiClaudeError>;
