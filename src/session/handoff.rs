//! Selector protocol v1.
//!
//! The selector runs as a child process and reports through its exit code
//! plus, for codes 0 and 3, a JSON file at the path given in
//! `MCLAUDE_SELECTION_FILE`. The reader deletes the file once parsed.

use crate::config::{Provider, ProviderKind};
use crate::error::{MultiClaudeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_ENV: &str = "MCLAUDE_SELECTOR_PROTOCOL";
pub const SELECTION_FILE_ENV: &str = "MCLAUDE_SELECTION_FILE";

pub const EXIT_LAUNCH: i32 = 0;
pub const EXIT_CANCELLED: i32 = 1;
pub const EXIT_RESTART: i32 = 2;
pub const EXIT_OAUTH_REQUEST: i32 = 3;

/// What a selector exit code means to the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorExit {
    /// A [`SelectionPayload`] was written
    Launch,
    /// The selector finished an OAuth login itself; show it again
    Restart,
    /// An [`OAuthLoginRequest`] was written
    OAuthRequest,
    /// Anything else ends the session with this code
    Final(i32),
}

impl SelectorExit {
    pub fn from_code(code: i32) -> Self {
        match code {
            EXIT_LAUNCH => SelectorExit::Launch,
            EXIT_RESTART => SelectorExit::Restart,
            EXIT_OAUTH_REQUEST => SelectorExit::OAuthRequest,
            other => SelectorExit::Final(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            SelectorExit::Launch => EXIT_LAUNCH,
            SelectorExit::Restart => EXIT_RESTART,
            SelectorExit::OAuthRequest => EXIT_OAUTH_REQUEST,
            SelectorExit::Final(code) => *code,
        }
    }
}

/// Everything the launcher needs to rebuild the chosen provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub provider_id: String,
    pub provider_name: String,
    pub template_id: String,
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub models: Vec<String>,
    /// `None` or empty for OAuth providers
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub installation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl SelectionPayload {
    pub fn new(provider: &Provider, model: &str, installation_id: &str) -> Self {
        Self {
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            template_id: provider.template_id.clone(),
            kind: provider.kind,
            api_key: provider.api_key.clone(),
            models: provider.models.clone(),
            model: (!model.is_empty()).then(|| model.to_string()),
            installation_id: Some(installation_id.to_string()),
            base_url: provider.base_url.clone(),
        }
    }

    pub fn provider(&self) -> Provider {
        Provider {
            id: self.provider_id.clone(),
            name: self.provider_name.clone(),
            template_id: self.template_id.clone(),
            kind: self.kind,
            api_key: self.api_key.clone(),
            models: self.models.clone(),
            base_url: self.base_url.clone(),
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum OAuthLoginTag {
    #[serde(rename = "oauth-login")]
    OAuthLogin,
}

/// Asks the supervisor to run `claude login` for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthLoginRequest {
    #[serde(rename = "type")]
    tag: OAuthLoginTag,
    pub provider_id: String,
    pub provider_name: String,
    /// The provider was created for this login and goes away if it fails
    #[serde(default)]
    pub is_new: bool,
}

impl OAuthLoginRequest {
    pub fn new(provider_id: impl Into<String>, provider_name: impl Into<String>, is_new: bool) -> Self {
        Self {
            tag: OAuthLoginTag::OAuthLogin,
            provider_id: provider_id.into(),
            provider_name: provider_name.into(),
            is_new,
        }
    }
}

/// Write a handoff document. The file may hold an API key, so it is
/// restricted to the owner on Unix.
pub fn write<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec(payload)?)?;
    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    tracing::debug!(path = %path.display(), "handoff written");
    Ok(())
}

/// Read a handoff document and delete it, whether or not it parses.
pub fn take<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|source| MultiClaudeError::HandoffRead {
        path: path.to_path_buf(),
        source,
    })?;
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "handoff file not removed");
    }
    serde_json::from_str(&raw).map_err(|e| MultiClaudeError::Handoff(e.to_string()))
}
