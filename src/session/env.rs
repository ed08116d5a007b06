//! Environment synthesis for agent sessions.
//!
//! [`synthesize`] is pure: it takes an explicit snapshot of the base
//! environment and returns a new map. Variables from a previous session may
//! still be present in the snapshot since the selector and launcher inherit
//! each other's environment, so every path strips what it does not own.

use crate::config::credentials::valid_credentials;
use crate::config::{InstallationTarget, Layout, Provider};
use crate::providers::{template_by_id, EnvRule, ProviderTemplate, TEMPLATES};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub type EnvMap = BTreeMap<String, String>;

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const AUTH_TOKEN_VAR: &str = "ANTHROPIC_AUTH_TOKEN";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const CONFIG_DIR_VAR: &str = "CLAUDE_CONFIG_DIR";
pub const OAUTH_TOKEN_VAR: &str = "CLAUDE_CODE_OAUTH_TOKEN";

/// Primary model followed by the tier fallbacks, all set to the same value.
pub const MODEL_VARS: &[&str] = &[
    "ANTHROPIC_MODEL",
    "CLAUDE_CODE_SUBAGENT_MODEL",
    "ANTHROPIC_DEFAULT_SONNET_MODEL",
    "ANTHROPIC_DEFAULT_OPUS_MODEL",
    "ANTHROPIC_DEFAULT_HAIKU_MODEL",
];

const LEGACY_MODEL_VARS: &[&str] = &["ANTHROPIC_SMALL_FAST_MODEL"];

/// Prefixes of variables the agent sets for its own children.
const AGENT_PREFIXES: &[&str] = &["CLAUDECODE", "CLAUDE_CODE"];

/// Process environment snapshot. Entries that are not valid UTF-8 are
/// skipped.
pub fn current_env() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Build the session environment for `provider`, reading OAuth credentials
/// from the layout. `None` when the provider's template is unknown.
pub fn build_env(
    base: &EnvMap,
    provider: &Provider,
    model: &str,
    installation: &InstallationTarget,
    layout: &Layout,
) -> Option<EnvMap> {
    let config_dir = installation
        .dir_name()
        .map(|dir_name| layout.installation_path(dir_name));
    let oauth_token = if provider.is_oauth() {
        valid_credentials(layout, &provider.id).map(|c| c.access_token)
    } else {
        None
    };
    synthesize(base, provider, model, config_dir, oauth_token.as_deref())
}

/// Core synthesis. `config_dir` is the installation directory for managed
/// installations and `None` for the default one.
pub fn synthesize(
    base: &EnvMap,
    provider: &Provider,
    model: &str,
    config_dir: Option<PathBuf>,
    oauth_token: Option<&str>,
) -> Option<EnvMap> {
    let template = template_by_id(&provider.template_id)?;
    let mut env = base.clone();

    if provider.is_oauth() {
        for var in [API_KEY_VAR, AUTH_TOKEN_VAR, BASE_URL_VAR, CONFIG_DIR_VAR] {
            env.remove(var);
        }
        for var in MODEL_VARS.iter().chain(LEGACY_MODEL_VARS) {
            env.remove(*var);
        }
        remove_owned(&mut env, None);
        remove_agent_prefixed(&mut env);

        if let Some(token) = oauth_token {
            env.insert(OAUTH_TOKEN_VAR.to_string(), token.to_string());
        }
    } else {
        apply_rule(&mut env, template, provider);
        apply_static(&mut env, template);
        remove_owned(&mut env, template.env_rule.family_key_var());
        remove_agent_prefixed(&mut env);
        for var in LEGACY_MODEL_VARS {
            env.remove(*var);
        }
        apply_static(&mut env, template);

        for var in MODEL_VARS {
            env.insert(var.to_string(), model.to_string());
        }
    }

    match config_dir {
        Some(dir) => {
            env.insert(CONFIG_DIR_VAR.to_string(), dir.to_string_lossy().into_owned());
        }
        None => {
            env.remove(CONFIG_DIR_VAR);
        }
    }

    Some(env)
}

fn apply_rule(env: &mut EnvMap, template: &ProviderTemplate, provider: &Provider) {
    let base_url = provider
        .base_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .unwrap_or(template.base_url);

    let key = match (template.env_rule, provider.api_key.is_empty()) {
        (EnvRule::LocalFixedKey, true) => template.default_api_key.unwrap_or(template.id),
        _ => provider.api_key.as_str(),
    };

    match template.env_rule {
        EnvRule::OAuthNoop => {}
        EnvRule::DefaultBearerToken | EnvRule::LocalFixedKey => {
            env.insert(BASE_URL_VAR.to_string(), base_url.to_string());
            env.insert(AUTH_TOKEN_VAR.to_string(), key.to_string());
            env.remove(API_KEY_VAR);
        }
        EnvRule::BearerTokenPlusFamilyKey { key_var } => {
            env.insert(key_var.to_string(), key.to_string());
            env.insert(BASE_URL_VAR.to_string(), base_url.to_string());
            env.insert(AUTH_TOKEN_VAR.to_string(), key.to_string());
            env.remove(API_KEY_VAR);
        }
    }
}

fn apply_static(env: &mut EnvMap, template: &ProviderTemplate) {
    for (key, value) in template.extra_env {
        env.insert(key.to_string(), value.to_string());
    }
}

/// Remove every static or family-key variable any template may set, except
/// `keep`.
fn remove_owned(env: &mut EnvMap, keep: Option<&str>) {
    for template in TEMPLATES {
        let statics = template.extra_env.iter().map(|(key, _)| *key);
        for var in statics.chain(template.env_rule.family_key_var()) {
            if Some(var) != keep {
                env.remove(var);
            }
        }
    }
}

fn remove_agent_prefixed(env: &mut EnvMap) {
    env.retain(|key, _| !AGENT_PREFIXES.iter().any(|prefix| key.starts_with(prefix)));
}
