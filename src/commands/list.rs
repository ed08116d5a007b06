use crate::config::{Config, ConfigStore, DEFAULT_INSTALLATION_ID};
use crate::error::Result;
use crate::providers::effective_models;
use crate::resolve::cli_id;
use crate::utils::slug::slugify;
use serde::Serialize;

const USAGE: &str =
    "mclaude --provider <cliId> [--model <model>] [--installation <cliId>] [claude-flags...]";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedProvider {
    cli_id: String,
    name: String,
    template_id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    models: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedInstallation {
    cli_id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct Listing {
    providers: Vec<ListedProvider>,
    installations: Vec<ListedInstallation>,
    usage: &'static str,
}

fn listing(config: &Config) -> Listing {
    let providers = config
        .providers
        .iter()
        .map(|p| ListedProvider {
            cli_id: cli_id(p, &config.providers),
            name: p.name.clone(),
            template_id: p.template_id.clone(),
            kind: p.kind.as_str(),
            models: effective_models(p),
        })
        .collect();

    let installations = std::iter::once(ListedInstallation {
        cli_id: DEFAULT_INSTALLATION_ID.to_string(),
        name: "Default".to_string(),
    })
    .chain(config.installations.iter().map(|i| ListedInstallation {
        cli_id: slugify(&i.name),
        name: i.name.clone(),
    }))
    .collect();

    Listing {
        providers,
        installations,
        usage: USAGE,
    }
}

/// Print the headless-mode summary as indented JSON.
pub fn execute(store: &ConfigStore) -> Result<()> {
    let config = store.load_migrated();
    println!("{}", serde_json::to_string_pretty(&listing(&config))?);
    Ok(())
}
