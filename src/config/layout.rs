use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Overrides the root directory (defaults to `~/.multi-claude`).
pub const HOME_ENV: &str = "MCLAUDE_HOME";

const ROOT_DIR_NAME: &str = ".multi-claude";
const CONFIG_FILE: &str = "config.json";
const SELECTION_FILE: &str = "last-selection.json";
const CREDENTIALS_FILE: &str = ".credentials.json";

/// On-disk layout of everything this tool owns.
///
/// ```text
/// <root>/config.json
/// <root>/last-selection.json        selector -> supervisor handoff
/// <root>/accounts/<providerId>/     OAuth credential dirs
/// <root>/installations/<dirName>/   isolated agent state dirs
/// <root>/logs/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the root from `MCLAUDE_HOME`, falling back to `$HOME/.multi-claude`.
    pub fn from_env() -> Self {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Self::new(root);
        }
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(ROOT_DIR_NAME))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn selection_file(&self) -> PathBuf {
        self.root.join(SELECTION_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn accounts_dir(&self) -> PathBuf {
        self.root.join("accounts")
    }

    pub fn account_dir(&self, provider_id: &str) -> PathBuf {
        self.accounts_dir().join(provider_id)
    }

    pub fn credentials_file(&self, provider_id: &str) -> PathBuf {
        self.account_dir(provider_id).join(CREDENTIALS_FILE)
    }

    pub fn installations_dir(&self) -> PathBuf {
        self.root.join("installations")
    }

    pub fn installation_path(&self, dir_name: &str) -> PathBuf {
        self.installations_dir().join(dir_name)
    }

    pub fn ensure_account_dir(&self, provider_id: &str) -> io::Result<PathBuf> {
        let dir = self.account_dir(provider_id);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn remove_account_dir(&self, provider_id: &str) -> io::Result<()> {
        remove_dir_if_exists(&self.account_dir(provider_id))
    }

    pub fn ensure_installation_dir(&self, dir_name: &str) -> io::Result<PathBuf> {
        let dir = self.installation_path(dir_name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn remove_installation_dir(&self, dir_name: &str) -> io::Result<()> {
        remove_dir_if_exists(&self.installation_path(dir_name))
    }

    /// Move an installation directory. Returns `Ok(false)` without touching
    /// anything when the names are equal or empty, the source is missing or
    /// the target already exists.
    pub fn rename_installation_dir(&self, old_dir_name: &str, new_dir_name: &str) -> io::Result<bool> {
        if old_dir_name == new_dir_name || old_dir_name.is_empty() || new_dir_name.is_empty() {
            return Ok(false);
        }
        let old_path = self.installation_path(old_dir_name);
        let new_path = self.installation_path(new_dir_name);
        if !old_path.exists() || new_path.exists() {
            return Ok(false);
        }
        fs::rename(&old_path, &new_path)?;
        Ok(true)
    }
}

fn remove_dir_if_exists(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
