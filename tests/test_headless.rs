//! Headless mode: `--provider` skips the selector and launches the agent
//! directly.
#![cfg(unix)]

mod common;

use common::{config_json, provider_json, Sandbox};
use predicates::prelude::*;

fn deepseek_sandbox() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox.write_config(&config_json(
        &[provider_json("p1", "DeepSeek", "deepseek", "api", &[])],
        "[]",
    ));
    sandbox
}

#[test]
fn test_headless_launch_forwards_args_and_exit_code() {
    let sandbox = deepseek_sandbox();
    let agent = sandbox.fake_agent(7);

    sandbox
        .cmd()
        .args(["--provider", "deepseek", "-p", "hello"])
        .env("MCLAUDE_CLAUDE_BIN", &agent)
        .env("ANTHROPIC_API_KEY", "leaked")
        .assert()
        .code(7)
        .stdout(predicate::str::contains(
            "[mclaude] DeepSeek (deepseek-chat) — exited with code 7",
        ));

    let out = sandbox.agent_output();
    assert!(out.contains("args=--model deepseek-chat -p hello"), "{}", out);
    assert!(out.contains("ANTHROPIC_BASE_URL=https://api.deepseek.com/anthropic"));
    assert!(out.contains("ANTHROPIC_AUTH_TOKEN=sk-test"));
    assert!(out.contains("ANTHROPIC_MODEL=deepseek-chat"));
    assert!(!out.contains("ANTHROPIC_API_KEY="));
    assert!(!out.contains("CLAUDE_CONFIG_DIR="));
}

#[test]
fn test_headless_explicit_model_is_not_duplicated() {
    let sandbox = deepseek_sandbox();
    let agent = sandbox.fake_agent(0);

    sandbox
        .cmd()
        .args(["--provider", "DeepSeek", "-c", "--model", "deepseek-reasoner"])
        .env("MCLAUDE_CLAUDE_BIN", &agent)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[mclaude] DeepSeek (deepseek-reasoner) — session ended",
        ));

    assert!(sandbox
        .agent_output()
        .contains("args=--model deepseek-reasoner -c\n"));
}

#[test]
fn test_headless_unknown_model_warns_and_proceeds() {
    let sandbox = deepseek_sandbox();
    let agent = sandbox.fake_agent(0);

    sandbox
        .cmd()
        .args(["--provider", "deepseek", "--model=deepseek-v9"])
        .env("MCLAUDE_CLAUDE_BIN", &agent)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "\"deepseek-v9\" is not in the configured models",
        ))
        .stderr(predicate::str::contains("Proceeding anyway..."));

    assert!(sandbox.agent_output().contains("ANTHROPIC_MODEL=deepseek-v9"));
}

#[test]
fn test_headless_installation_sets_config_dir() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&config_json(
        &[provider_json("p1", "Box", "ollama", "api", &["llama3"])],
        r#"[{"id":"ab12cd34","name":"Work","dirName":"ab12cd34-work"}]"#,
    ));
    let agent = sandbox.fake_agent(0);

    sandbox
        .cmd()
        .args(["--provider", "ollama", "--installation", "work"])
        .env("MCLAUDE_CLAUDE_BIN", &agent)
        .assert()
        .success();

    let expected = format!(
        "CLAUDE_CONFIG_DIR={}",
        sandbox.home().join("installations").join("ab12cd34-work").display()
    );
    let out = sandbox.agent_output();
    assert!(out.contains(&expected), "{}", out);
    assert!(out.contains("ANTHROPIC_AUTH_TOKEN=sk-test"));
    assert!(out.contains("ANTHROPIC_BASE_URL=http://localhost:11434"));
}

#[test]
fn test_headless_default_installation_any_case() {
    let sandbox = deepseek_sandbox();
    let agent = sandbox.fake_agent(0);

    sandbox
        .cmd()
        .args(["--provider", "deepseek", "--installation", "DEFAULT"])
        .env("MCLAUDE_CLAUDE_BIN", &agent)
        .env("CLAUDE_CONFIG_DIR", "/somewhere/else")
        .assert()
        .success();

    assert!(!sandbox.agent_output().contains("CLAUDE_CONFIG_DIR="));
}

#[test]
fn test_headless_ambiguous_provider() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&config_json(
        &[
            provider_json("a", "Work", "deepseek", "api", &[]),
            provider_json("b", "Work", "zai", "api", &[]),
        ],
        "[]",
    ));
    let agent = sandbox.fake_agent(0);

    sandbox
        .cmd()
        .args(["--provider", "Work"])
        .env("MCLAUDE_CLAUDE_BIN", &agent)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Multiple providers match \"Work\""))
        .stderr(predicate::str::contains("\"Work\" (deepseek)"))
        .stderr(predicate::str::contains("\"Work\" (zai)"));

    assert!(sandbox.agent_output().is_empty());
}

#[test]
fn test_headless_unknown_provider_lists_available() {
    let sandbox = deepseek_sandbox();
    sandbox
        .cmd()
        .args(["--provider", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Provider \"ghost\" not found"))
        .stderr(predicate::str::contains("\"DeepSeek\" (deepseek)"));
}

#[test]
fn test_headless_without_providers() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--provider", "deepseek"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No providers configured"));
}

#[test]
fn test_headless_provider_flag_needs_value() {
    let sandbox = deepseek_sandbox();
    sandbox
        .cmd()
        .arg("--provider")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--provider requires a value"));
}

#[test]
fn test_headless_missing_executable() {
    let sandbox = deepseek_sandbox();
    sandbox
        .cmd()
        .args(["--provider", "deepseek"])
        .env("MCLAUDE_CLAUDE_BIN", sandbox.path("no-such-claude"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found in PATH"));
}

#[test]
fn test_headless_oauth_not_authenticated() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&config_json(
        &[provider_json("acc", "Claude", "anthropic", "oauth", &[])],
        "[]",
    ));
    sandbox
        .cmd()
        .args(["--provider", "claude"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not authenticated"));
}

#[test]
fn test_headless_oauth_launch_uses_token() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&config_json(
        &[provider_json("acc", "Claude", "anthropic", "oauth", &[])],
        "[]",
    ));
    let account = sandbox.home().join("accounts").join("acc");
    std::fs::create_dir_all(&account).unwrap();
    let expires_at = chrono::Utc::now().timestamp_millis() + 3_600_000;
    std::fs::write(
        account.join(".credentials.json"),
        format!(
            r#"{{"claudeAiOauth":{{"accessToken":"tok-1","refreshToken":"r","expiresAt":{}}}}}"#,
            expires_at
        ),
    )
    .unwrap();
    let agent = sandbox.fake_agent(0);

    sandbox
        .cmd()
        .args(["--provider", "anthropic", "-c"])
        .env("MCLAUDE_CLAUDE_BIN", &agent)
        .env("ANTHROPIC_BASE_URL", "https://stale.example")
        .env("ANTHROPIC_MODEL", "stale")
        .assert()
        .success()
        .stdout(predicate::str::contains("[mclaude] Claude — session ended"));

    let out = sandbox.agent_output();
    assert!(out.contains("args=-c\n"), "{}", out);
    assert!(out.contains("CLAUDE_CODE_OAUTH_TOKEN=tok-1"));
    assert!(!out.contains("ANTHROPIC_BASE_URL="));
    assert!(!out.contains("ANTHROPIC_MODEL="));
}
