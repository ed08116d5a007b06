#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway `MCLAUDE_HOME` plus a place for fake executables.
pub struct Sandbox {
    tmp: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn home(&self) -> PathBuf {
        self.tmp.path().join("home")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    pub fn write_config(&self, json: &str) {
        fs::create_dir_all(self.home()).unwrap();
        fs::write(self.home().join("config.json"), json).unwrap();
    }

    pub fn config(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.home().join("config.json")).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    /// Write an executable shell script and return its path.
    #[cfg(unix)]
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Fake agent recording its arguments and routing variables in
    /// `agent.out`, then exiting with `code`.
    #[cfg(unix)]
    pub fn fake_agent(&self, code: i32) -> PathBuf {
        let out = self.path("agent.out");
        self.script(
            "claude",
            &format!(
                r#"echo "args=$*" > '{out}'
env | grep -E '^(ANTHROPIC|CLAUDE|API_TIMEOUT)' | sort >> '{out}'
exit {code}"#,
                out = out.display(),
                code = code
            ),
        )
    }

    pub fn agent_output(&self) -> String {
        fs::read_to_string(self.path("agent.out")).unwrap_or_default()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mclaude"));
        cmd.env("MCLAUDE_HOME", self.home())
            .env_remove("MCLAUDE_SELECTOR")
            .env_remove("MCLAUDE_CLAUDE_BIN")
            .env_remove("CLAUDE_CONFIG_DIR");
        cmd
    }
}

pub fn provider_json(id: &str, name: &str, template: &str, kind: &str, models: &[&str]) -> String {
    serde_json::json!({
        "id": id,
        "name": name,
        "templateId": template,
        "type": kind,
        "apiKey": if kind == "api" { "sk-test" } else { "" },
        "models": models,
    })
    .to_string()
}

pub fn config_json(providers: &[String], installations: &str) -> String {
    format!(
        r#"{{"providers":[{}],"installations":{}}}"#,
        providers.join(","),
        installations
    )
}
