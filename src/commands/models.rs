use crate::cli::ModelsCommands;
use crate::commands::helpers::{find_provider, runtime};
use crate::config::{ConfigStore, Provider};
use crate::error::{MultiClaudeError, Result};
use crate::providers::{fetch_models, models_with_source, supports_model_fetch, template_by_id, ModelMeta};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn execute(store: &ConfigStore, command: &ModelsCommands) -> Result<()> {
    match command {
        ModelsCommands::List { provider } => {
            let provider = api_provider(store, provider)?;
            let models = models_with_source(&provider);
            if models.is_empty() {
                println!(
                    "No models for \"{}\". Add one with 'mclaude models add {} <model>'.",
                    provider.name, provider.template_id
                );
                return Ok(());
            }
            println!("Models for \"{}\":", provider.name);
            for model in models {
                println!("  {:<48} {}", model.name, model.source.as_str());
            }
            Ok(())
        }
        ModelsCommands::Add { provider, models } => {
            let provider = api_provider(store, provider)?;
            let mut added = Vec::new();
            store.update_provider(&provider.id, |p| {
                for model in models {
                    if p.add_model(model.trim()) {
                        added.push(model.trim().to_string());
                    }
                }
            })?;
            report("Added", &added, &provider);
            Ok(())
        }
        ModelsCommands::Remove { provider, models } => {
            let provider = api_provider(store, provider)?;
            let mut removed = Vec::new();
            store.update_provider(&provider.id, |p| {
                for model in models {
                    if p.remove_model(model) {
                        removed.push(model.clone());
                    }
                }
            })?;

            let defaults = template_by_id(&provider.template_id)
                .map(|t| t.default_models)
                .unwrap_or_default();
            for model in models.iter().filter(|m| defaults.contains(&m.as_str())) {
                eprintln!("\"{}\" is a template default and stays available.", model);
            }
            report("Removed", &removed, &provider);
            Ok(())
        }
        ModelsCommands::Fetch { provider, add } => fetch(store, provider, *add),
    }
}

fn api_provider(store: &ConfigStore, input: &str) -> Result<Provider> {
    let provider = find_provider(&store.load(), input)?;
    if provider.is_oauth() {
        return Err(MultiClaudeError::InvalidArgs(format!(
            "\"{}\" is an Anthropic account; Claude Code picks its model.",
            provider.name
        )));
    }
    Ok(provider)
}

fn report(verb: &str, models: &[String], provider: &Provider) {
    if models.is_empty() {
        println!("No changes to \"{}\".", provider.name);
    } else {
        println!("{} {} for \"{}\".", verb, models.join(", "), provider.name);
    }
}

fn fetch(store: &ConfigStore, input: &str, add: bool) -> Result<()> {
    let provider = api_provider(store, input)?;
    if !supports_model_fetch(&provider.template_id) {
        return Err(MultiClaudeError::InvalidArgs(format!(
            "Template \"{}\" has no model listing API.",
            provider.template_id
        )));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching models for {}...", provider.name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    // Ctrl-C drops the request future, so nothing below runs for it
    let outcome = runtime()?.block_on(async {
        tokio::select! {
            result = fetch_models(&provider.template_id, &provider.api_key, provider.base_url.as_deref()) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        }
    });
    spinner.finish_and_clear();

    let models = match outcome {
        None => {
            tracing::debug!(provider = %provider.name, "model fetch cancelled");
            println!("Cancelled.");
            return Ok(());
        }
        Some(result) => result?,
    };

    if models.is_empty() {
        println!("\"{}\" reported no models.", provider.name);
        return Ok(());
    }

    for model in &models {
        let details = describe(model);
        if details.is_empty() {
            println!("  {}", model.id);
        } else {
            println!("  {:<48} {}", model.id, details);
        }
    }

    if add {
        let mut added = Vec::new();
        store.update_provider(&provider.id, |p| {
            for model in &models {
                if p.add_model(&model.id) {
                    added.push(model.id.clone());
                }
            }
        })?;
        println!("\nStored {} new model(s) with \"{}\".", added.len(), provider.name);
    } else {
        println!("\n{} model(s). Store them with --add.", models.len());
    }
    Ok(())
}

/// One-line summary of the metadata a listing API returned.
fn describe(model: &ModelMeta) -> String {
    let mut parts = Vec::new();
    if let Some(ctx) = model.context_length {
        parts.push(format!("ctx {}", format_tokens(ctx)));
    }
    if let Some(size) = &model.parameter_size {
        parts.push(size.clone());
    }
    if let Some(quant) = &model.quantization {
        parts.push(quant.clone());
    }
    if let Some(bytes) = model.file_size {
        parts.push(format!("{:.1} GB", bytes as f64 / 1e9));
    }
    if let Some(pricing) = &model.pricing {
        if let (Ok(prompt), Ok(completion)) =
            (pricing.prompt.parse::<f64>(), pricing.completion.parse::<f64>())
        {
            parts.push(format!("${:.2}/${:.2} per M", prompt * 1e6, completion * 1e6));
        }
    }
    parts.join(", ")
}

fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{}k", n / 1_000)
    } else {
        n.to_string()
    }
}
