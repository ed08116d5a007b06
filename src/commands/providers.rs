use crate::cli::ProvidersCommands;
use crate::commands::helpers::{confirm, find_provider, runtime};
use crate::config::credentials::{is_authenticated, valid_credentials};
use crate::config::{ConfigStore, Provider, ProviderKind};
use crate::error::{MultiClaudeError, Result};
use crate::providers::{
    effective_models, supports_key_validation, template_by_id, validate_api_key, ProviderTemplate,
    ANTHROPIC_TEMPLATE_ID,
};
use crate::session::{agent_program, current_env, oauth};

const DEFAULT_OAUTH_NAME: &str = "Claude Account";

pub fn execute(store: &ConfigStore, command: &ProvidersCommands) -> Result<()> {
    match command {
        ProvidersCommands::List => list(store),
        ProvidersCommands::Add {
            template,
            name,
            api_key,
            base_url,
            models,
            oauth,
        } => {
            let template = template.as_deref().unwrap_or(ANTHROPIC_TEMPLATE_ID);
            let template = template_by_id(template)
                .ok_or_else(|| MultiClaudeError::TemplateMissing(template.to_string()))?;
            if *oauth || template.is_oauth() {
                add_oauth(store, name.as_deref())
            } else {
                let provider = build_api_provider(
                    template,
                    name.as_deref(),
                    api_key.as_deref(),
                    base_url.as_deref(),
                    models,
                )?;
                check_key(&provider)?;
                let provider = store.add_provider(provider)?;
                println!("Added provider \"{}\" ({}).", provider.name, provider.template_id);
                Ok(())
            }
        }
        ProvidersCommands::Remove { provider, yes } => remove(store, provider, *yes),
        ProvidersCommands::Rename { provider, new_name } => {
            let new_name = non_empty(new_name, "name")?;
            let provider = find_provider(&store.load(), provider)?;
            store.update_provider(&provider.id, |p| p.name = new_name.to_string())?;
            println!("Renamed \"{}\" to \"{}\".", provider.name, new_name);
            Ok(())
        }
        ProvidersCommands::SetKey { provider, api_key } => {
            let api_key = non_empty(api_key, "API key")?;
            let mut provider = api_only(find_provider(&store.load(), provider)?)?;
            provider.api_key = api_key.to_string();
            check_key(&provider)?;
            store.update_provider(&provider.id, |p| p.api_key = api_key.to_string())?;
            println!("Updated the API key of \"{}\".", provider.name);
            Ok(())
        }
        ProvidersCommands::SetUrl { provider, base_url } => {
            let provider = api_only(find_provider(&store.load(), provider)?)?;
            let base_url = base_url
                .as_deref()
                .map(|url| url.trim().trim_end_matches('/'))
                .filter(|url| !url.is_empty())
                .map(str::to_string);
            match &base_url {
                Some(url) => println!("\"{}\" now uses {}.", provider.name, url),
                None => println!("\"{}\" now uses the template base URL.", provider.name),
            }
            store.update_provider(&provider.id, |p| p.base_url = base_url)?;
            Ok(())
        }
        ProvidersCommands::Login { provider } => {
            let provider = find_provider(&store.load(), provider)?;
            if !provider.is_oauth() {
                return Err(MultiClaudeError::InvalidArgs(format!(
                    "\"{}\" uses an API key; only Anthropic accounts log in.",
                    provider.name
                )));
            }
            if oauth::login(&agent_program(), store, &current_env(), &provider.id)? {
                println!("\n✓ Account \"{}\" authenticated.", provider.name);
                Ok(())
            } else {
                Err(MultiClaudeError::InvalidArgs("Re-authentication failed.".to_string()))
            }
        }
    }
}

fn list(store: &ConfigStore) -> Result<()> {
    let config = store.load_migrated();
    if config.providers.is_empty() {
        println!("No providers configured. Add one with 'mclaude providers add'.");
        return Ok(());
    }

    println!("{:<28} {:<12} {:<7} {}", "NAME", "TEMPLATE", "TYPE", "DETAILS");
    println!("{}", "-".repeat(72));
    for provider in &config.providers {
        println!(
            "{:<28} {:<12} {:<7} {}",
            provider.name,
            provider.template_id,
            provider.kind.as_str(),
            details(store, provider)
        );
    }
    Ok(())
}

fn details(store: &ConfigStore, provider: &Provider) -> String {
    if provider.is_oauth() {
        let layout = store.layout();
        return if !is_authenticated(layout, &provider.id) {
            "not authenticated".to_string()
        } else if valid_credentials(layout, &provider.id).is_none() {
            "token expired".to_string()
        } else {
            "authenticated".to_string()
        };
    }
    let models = effective_models(provider);
    let mut details = match models.len() {
        0 => "no models".to_string(),
        1 => "1 model".to_string(),
        n => format!("{} models", n),
    };
    if let Some(url) = &provider.base_url {
        details.push_str(&format!(", {}", url));
    }
    details
}

fn build_api_provider(
    template: &ProviderTemplate,
    name: Option<&str>,
    api_key: Option<&str>,
    base_url: Option<&str>,
    models: &[String],
) -> Result<Provider> {
    let api_key = api_key
        .filter(|key| !key.is_empty())
        .or(template.default_api_key)
        .ok_or_else(|| {
            MultiClaudeError::InvalidArgs(format!(
                "--api-key is required for template \"{}\".",
                template.id
            ))
        })?;

    let mut provider = Provider {
        id: uuid::Uuid::new_v4().to_string(),
        name: name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(template.description)
            .to_string(),
        template_id: template.id.to_string(),
        kind: ProviderKind::Api,
        api_key: api_key.to_string(),
        models: Vec::new(),
        base_url: base_url
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .map(str::to_string),
    };
    for model in models {
        provider.add_model(model.trim());
    }
    Ok(provider)
}

/// Validate the key remotely for families that support it. A rejected or
/// unverifiable key is fatal.
fn check_key(provider: &Provider) -> Result<()> {
    if !supports_key_validation(&provider.template_id) {
        return Ok(());
    }
    println!("Validating API key...");
    runtime()?
        .block_on(validate_api_key(&provider.template_id, &provider.api_key))
        .map_err(|e| {
            tracing::debug!(template = %provider.template_id, error = %e, "key validation failed");
            MultiClaudeError::Fetch(e)
        })
}

fn add_oauth(store: &ConfigStore, name: Option<&str>) -> Result<()> {
    let provider = store.add_provider(Provider {
        id: uuid::Uuid::new_v4().to_string(),
        name: name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_OAUTH_NAME)
            .to_string(),
        template_id: ANTHROPIC_TEMPLATE_ID.to_string(),
        kind: ProviderKind::Oauth,
        api_key: String::new(),
        models: Vec::new(),
        base_url: None,
    })?;

    println!("Logging in to \"{}\" with Claude Code...", provider.name);
    if oauth::login(&agent_program(), store, &current_env(), &provider.id)? {
        println!("\n✓ Account \"{}\" authenticated.", provider.name);
        return Ok(());
    }

    store.remove_provider(&provider.id)?;
    store.layout().remove_account_dir(&provider.id)?;
    Err(MultiClaudeError::InvalidArgs(
        "Authentication failed. The account was not added.".to_string(),
    ))
}

fn remove(store: &ConfigStore, input: &str, yes: bool) -> Result<()> {
    let provider = find_provider(&store.load(), input)?;

    if !yes && !confirm(&format!("Remove provider \"{}\" ({})?", provider.name, provider.template_id))? {
        println!("Aborted.");
        return Ok(());
    }

    store.remove_provider(&provider.id)?;
    println!("Removed provider \"{}\".", provider.name);
    Ok(())
}

fn api_only(provider: Provider) -> Result<Provider> {
    if provider.is_oauth() {
        return Err(MultiClaudeError::InvalidArgs(format!(
            "\"{}\" is an Anthropic account; it has no API key or base URL.",
            provider.name
        )));
    }
    Ok(provider)
}

fn non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MultiClaudeError::InvalidArgs(format!("The {} can't be empty.", what)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, ConfigStore) {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(Layout::new(tmp.path()));
        (tmp, store)
    }

    #[test]
    fn test_build_api_provider_defaults() {
        let template = template_by_id("ollama").unwrap();
        let provider = build_api_provider(
            template,
            None,
            None,
            Some("http://gpu-box:11434/"),
            &["llama3".to_string(), "llama3".to_string()],
        )
        .unwrap();
        assert_eq!(provider.name, template.description);
        assert_eq!(Some(provider.api_key.as_str()), template.default_api_key);
        assert_eq!(provider.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(provider.models, vec!["llama3"]);
        assert_eq!(provider.kind, ProviderKind::Api);
    }

    #[test]
    fn test_build_api_provider_requires_key() {
        let template = template_by_id("deepseek").unwrap();
        assert!(matches!(
            build_api_provider(template, Some("DS"), None, None, &[]),
            Err(MultiClaudeError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_add_rename_set_url_remove() {
        let (_tmp, store) = store();
        execute(
            &store,
            &ProvidersCommands::Add {
                template: Some("deepseek".to_string()),
                name: Some("Work".to_string()),
                api_key: Some("sk-1".to_string()),
                base_url: None,
                models: vec![],
                oauth: false,
            },
        )
        .unwrap();

        execute(
            &store,
            &ProvidersCommands::Rename {
                provider: "work".to_string(),
                new_name: "Office".to_string(),
            },
        )
        .unwrap();
        execute(
            &store,
            &ProvidersCommands::SetUrl {
                provider: "deepseek".to_string(),
                base_url: Some("https://proxy.example/".to_string()),
            },
        )
        .unwrap();

        let config = store.load();
        assert_eq!(config.providers[0].name, "Office");
        assert_eq!(config.providers[0].base_url.as_deref(), Some("https://proxy.example"));

        execute(
            &store,
            &ProvidersCommands::Remove {
                provider: "Office".to_string(),
                yes: true,
            },
        )
        .unwrap();
        assert!(store.load().providers.is_empty());
    }

    #[test]
    fn test_unknown_template() {
        let (_tmp, store) = store();
        let result = execute(
            &store,
            &ProvidersCommands::Add {
                template: Some("nope".to_string()),
                name: None,
                api_key: Some("k".to_string()),
                base_url: None,
                models: vec![],
                oauth: false,
            },
        );
        assert!(matches!(result, Err(MultiClaudeError::TemplateMissing(_))));
    }

    #[test]
    fn test_set_key_rejects_oauth_provider() {
        let (_tmp, store) = store();
        store
            .add_provider(Provider {
                id: "acc".to_string(),
                name: "Claude".to_string(),
                template_id: ANTHROPIC_TEMPLATE_ID.to_string(),
                kind: ProviderKind::Oauth,
                api_key: String::new(),
                models: vec![],
                base_url: None,
            })
            .unwrap();
        let result = execute(
            &store,
            &ProvidersCommands::SetKey {
                provider: "Claude".to_string(),
                api_key: "k".to_string(),
            },
        );
        assert!(matches!(result, Err(MultiClaudeError::InvalidArgs(_))));
    }
}
