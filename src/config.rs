//! Provider and installation registry persisted as `config.json`.
//!
//! The registry is re-read from disk on every access; there is no long-lived
//! cache. Mutating helpers on [`ConfigStore`] always load, modify and save so
//! edits made by a previous process in the selector/launcher sequence are
//! never lost.

pub mod credentials;
pub mod layout;

use crate::error::{MultiClaudeError, Result};
use crate::utils::slug::{compute_dir_name, generate_short_id, short_id_from};
pub use layout::Layout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Reserved installation id for the agent's own, unmanaged state directory.
/// Never stored as an [`Installation`].
pub const DEFAULT_INSTALLATION_ID: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Api,
    Oauth,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Api => "api",
            ProviderKind::Oauth => "oauth",
        }
    }
}

/// A configured routing target for the agent.
///
/// OAuth providers ignore `api_key`, `models` and `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub template_id: String,
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: String,
    /// User-added models, an ordered set
    #[serde(default)]
    pub models: Vec<String>,
    /// Overrides the template base URL
    #[serde(
        default,
        alias = "baseUrlOverride",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_url: Option<String>,
}

impl Provider {
    pub fn is_oauth(&self) -> bool {
        self.kind == ProviderKind::Oauth
    }

    /// Append a model unless already present. Returns whether it was added.
    pub fn add_model(&mut self, model: &str) -> bool {
        if model.is_empty() || self.models.iter().any(|m| m == model) {
            return false;
        }
        self.models.push(model.to_string());
        true
    }

    /// Returns whether the model was present.
    pub fn remove_model(&mut self, model: &str) -> bool {
        let before = self.models.len();
        self.models.retain(|m| m != model);
        self.models.len() != before
    }
}

/// An isolated copy of the agent's state directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub id: String,
    pub name: String,
    /// `<id>-<slug(name)>`; empty for records written before directory names
    /// existed (fixed up by [`ConfigStore::migrate_installations`])
    #[serde(default)]
    pub dir_name: String,
}

/// Which agent state directory a session uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstallationTarget {
    /// The agent's own default directory
    #[default]
    Default,
    Managed { id: String, dir_name: String },
}

impl InstallationTarget {
    /// Map an installation id from a handoff file onto the registry. Unknown
    /// ids are taken to be directory names, matching records written before
    /// directory names existed. Ids that could leave the installations
    /// directory fall back to the default installation.
    pub fn from_id(id: Option<&str>, installations: &[Installation]) -> Self {
        match id {
            None => InstallationTarget::Default,
            Some(id) if id.is_empty() || id.eq_ignore_ascii_case(DEFAULT_INSTALLATION_ID) => {
                InstallationTarget::Default
            }
            Some(id) => installations
                .iter()
                .find(|i| i.id == id || i.dir_name == id)
                .map(InstallationTarget::from)
                .unwrap_or_else(|| {
                    if id.contains(['/', '\\']) || id.contains("..") {
                        tracing::warn!(id, "ignoring installation id that is not a plain directory name");
                        InstallationTarget::Default
                    } else {
                        InstallationTarget::Managed {
                            id: id.to_string(),
                            dir_name: id.to_string(),
                        }
                    }
                }),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            InstallationTarget::Default => DEFAULT_INSTALLATION_ID,
            InstallationTarget::Managed { id, .. } => id,
        }
    }

    pub fn dir_name(&self) -> Option<&str> {
        match self {
            InstallationTarget::Default => None,
            InstallationTarget::Managed { dir_name, .. } => Some(dir_name),
        }
    }
}

impl From<&Installation> for InstallationTarget {
    fn from(inst: &Installation) -> Self {
        let dir_name = if inst.dir_name.is_empty() {
            inst.id.clone()
        } else {
            inst.dir_name.clone()
        };
        InstallationTarget::Managed {
            id: inst.id.clone(),
            dir_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub providers: Vec<Provider>,

    #[serde(default)]
    pub installations: Vec<Installation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Config {
    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn installation(&self, id: &str) -> Option<&Installation> {
        self.installations.iter().find(|i| i.id == id)
    }

    /// Serialize the way [`ConfigStore::save`] writes it: two-space indented
    /// JSON plus a trailing newline.
    pub fn to_canonical_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Loads and persists [`Config`] under a [`Layout`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    layout: Layout,
}

impl ConfigStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Read the config. Never fails: a missing file, invalid JSON or a
    /// document that doesn't match the schema all yield an empty config.
    pub fn load(&self) -> Config {
        let path = self.layout.config_file();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "config not readable, using defaults");
                return Config::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config is corrupt, using defaults");
                Config::default()
            }
        }
    }

    /// [`load`](Self::load) followed by the installation migration. A failed
    /// migration is logged and the in-memory result is still returned.
    pub fn load_migrated(&self) -> Config {
        let mut config = self.load();
        if let Err(e) = self.migrate_installations(&mut config) {
            tracing::warn!(error = %e, "installation migration could not be saved");
        }
        config
    }

    /// Write the config as canonical JSON, creating the root directory if
    /// needed. The file is replaced atomically and restricted to the owner
    /// on Unix since it holds API keys.
    pub fn save(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(self.layout.root())?;
        let path = self.layout.config_file();
        let tmp = path.with_extension("json.tmp");

        // A leftover temp file would keep its old mode
        match fs::remove_file(&tmp) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&tmp)?;
        file.write_all(config.to_canonical_json()?.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &path)?;

        tracing::debug!(
            providers = config.providers.len(),
            installations = config.installations.len(),
            "config saved"
        );
        Ok(())
    }

    /// Give every installation lacking a `dir_name` a short id and a
    /// slug-based directory, moving its old `installations/<id>` directory
    /// when possible. Returns whether anything changed (and was saved).
    pub fn migrate_installations(&self, config: &mut Config) -> Result<bool> {
        if config.installations.iter().all(|i| !i.dir_name.is_empty()) {
            return Ok(false);
        }

        for inst in config.installations.iter_mut().filter(|i| i.dir_name.is_empty()) {
            let short_id = short_id_from(&inst.id);
            let dir_name = compute_dir_name(&short_id, &inst.name);

            if let Err(e) = self.layout.rename_installation_dir(&inst.id, &dir_name) {
                tracing::warn!(
                    from = %inst.id,
                    to = %dir_name,
                    error = %e,
                    "could not move installation directory during migration"
                );
            }

            tracing::debug!(old_id = %inst.id, id = %short_id, dir = %dir_name, "migrated installation");
            inst.id = short_id;
            inst.dir_name = dir_name;
        }

        self.save(config)?;
        Ok(true)
    }

    pub fn add_provider(&self, provider: Provider) -> Result<Provider> {
        let mut config = self.load();
        config.providers.push(provider.clone());
        self.save(&config)?;
        Ok(provider)
    }

    /// Apply `edit` to the stored provider and save.
    pub fn update_provider<F>(&self, id: &str, edit: F) -> Result<Provider>
    where
        F: FnOnce(&mut Provider),
    {
        let mut config = self.load();
        let provider = config
            .providers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| MultiClaudeError::InvalidArgs(format!("No provider with id {}", id)))?;
        edit(provider);
        let updated = provider.clone();
        self.save(&config)?;
        Ok(updated)
    }

    /// Drop the provider record and its OAuth credential directory.
    /// Returns the removed record, or `None` if it was already gone.
    pub fn remove_provider(&self, id: &str) -> Result<Option<Provider>> {
        let mut config = self.load();
        let Some(index) = config.providers.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let removed = config.providers.remove(index);
        self.save(&config)?;
        self.layout.remove_account_dir(id)?;
        Ok(Some(removed))
    }

    pub fn add_installation(&self, name: &str) -> Result<Installation> {
        let mut config = self.load();
        let id = generate_short_id();
        let installation = Installation {
            dir_name: compute_dir_name(&id, name),
            id,
            name: name.to_string(),
        };
        config.installations.push(installation.clone());
        self.save(&config)?;
        self.layout.ensure_installation_dir(&installation.dir_name)?;
        Ok(installation)
    }

    /// Rename an installation and, when the derived directory name changes,
    /// move its directory. A failed move is logged and the record is still
    /// updated, leaving the old directory behind.
    pub fn rename_installation(&self, id: &str, new_name: &str) -> Result<Installation> {
        let mut config = self.load();
        let inst = config
            .installations
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| MultiClaudeError::InvalidArgs(format!("No installation with id {}", id)))?;

        let old_dir_name = std::mem::take(&mut inst.dir_name);
        inst.name = new_name.to_string();
        inst.dir_name = compute_dir_name(&inst.id, new_name);

        if old_dir_name != inst.dir_name {
            if let Err(e) = self.layout.rename_installation_dir(&old_dir_name, &inst.dir_name) {
                tracing::warn!(
                    from = %old_dir_name,
                    to = %inst.dir_name,
                    error = %e,
                    "installation directory not renamed"
                );
            }
        }

        let renamed = inst.clone();
        self.save(&config)?;
        Ok(renamed)
    }

    pub fn remove_installation(&self, id: &str) -> Result<Option<Installation>> {
        let mut config = self.load();
        let Some(index) = config.installations.iter().position(|i| i.id == id) else {
            return Ok(None);
        };
        let removed = config.installations.remove(index);
        self.save(&config)?;
        if !removed.dir_name.is_empty() {
            self.layout.remove_installation_dir(&removed.dir_name)?;
        }
        Ok(Some(removed))
    }

    /// Remove credentials, installations and logs, then write an empty
    /// config (language included).
    pub fn reset_all(&self) -> Result<()> {
        for dir in [
            self.layout.accounts_dir(),
            self.layout.installations_dir(),
            self.layout.logs_dir(),
        ] {
            match fs::remove_dir_all(&dir) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            }
        }
        self.save(&Config::default())
    }
}
