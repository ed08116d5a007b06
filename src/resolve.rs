//! Mapping user-supplied strings onto configured providers, models and
//! installations.

use crate::config::{Installation, InstallationTarget, Provider, DEFAULT_INSTALLATION_ID};
use crate::error::{MultiClaudeError, Result};
use crate::providers::effective_models;
use crate::utils::slug::slugify;

/// Number of known models listed when warning about an unknown one.
const WARN_MODEL_LIMIT: usize = 5;

/// Find the provider `input` designates.
///
/// Strategies are tried in order: case-insensitive name, template id, name
/// slug, exact id. The first strategy with exactly one match wins. A strategy
/// with several matches fails right away as ambiguous, even if a later one
/// would have singled out a provider.
pub fn resolve_provider<'a>(input: &str, providers: &'a [Provider]) -> Result<&'a Provider> {
    let input_lower = input.to_lowercase();
    let input_slug = slugify(input);

    let strategies: [&dyn Fn(&Provider) -> bool; 4] = [
        &|p: &Provider| p.name.to_lowercase() == input_lower,
        &|p: &Provider| p.template_id == input_lower,
        &|p: &Provider| !input_slug.is_empty() && slugify(&p.name) == input_slug,
        &|p: &Provider| p.id == input,
    ];

    for strategy in strategies {
        let found: Vec<&Provider> = providers.iter().filter(|p| strategy(*p)).collect();
        match found.as_slice() {
            [] => continue,
            [only] => return Ok(*only),
            many => {
                return Err(MultiClaudeError::AmbiguousProvider {
                    input: input.to_string(),
                    candidates: describe(many.iter().copied()),
                })
            }
        }
    }

    Err(MultiClaudeError::ProviderNotFound {
        input: input.to_string(),
        available: describe(providers.iter()),
    })
}

fn describe<'a>(providers: impl Iterator<Item = &'a Provider>) -> Vec<(String, String)> {
    providers
        .map(|p| (p.name.clone(), p.template_id.clone()))
        .collect()
}

/// A resolved model plus the warning to show when the requested model is
/// not among the provider's known models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChoice {
    pub model: String,
    pub warning: Option<String>,
}

/// Pick the model for a session. OAuth providers always get an empty model;
/// the agent chooses for them.
pub fn resolve_model(input: Option<&str>, provider: &Provider) -> Result<ModelChoice> {
    if provider.is_oauth() {
        return Ok(ModelChoice {
            model: String::new(),
            warning: None,
        });
    }

    let models = effective_models(provider);

    match input.filter(|m| !m.is_empty()) {
        Some(model) => {
            let warning = (!models.is_empty() && !models.iter().any(|m| m == model))
                .then(|| unknown_model_warning(model, &provider.name, &models));
            Ok(ModelChoice {
                model: model.to_string(),
                warning,
            })
        }
        None => models
            .into_iter()
            .next()
            .map(|model| ModelChoice {
                model,
                warning: None,
            })
            .ok_or_else(|| MultiClaudeError::NoModels(provider.name.clone())),
    }
}

fn unknown_model_warning(model: &str, provider_name: &str, known: &[String]) -> String {
    let shown = known
        .iter()
        .take(WARN_MODEL_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let extra = if known.len() > WARN_MODEL_LIMIT {
        format!(" (and {} more)", known.len() - WARN_MODEL_LIMIT)
    } else {
        String::new()
    };
    format!(
        "Warning: \"{}\" is not in the configured models for \"{}\".\nKnown models: {}{}\nProceeding anyway...",
        model, provider_name, shown, extra
    )
}

/// Find the installation `input` designates. Absent input and `default` in
/// any case select the agent's default directory. Otherwise the first
/// installation whose name (case-insensitive), name slug, id or directory
/// name matches is used.
pub fn resolve_installation(
    input: Option<&str>,
    installations: &[Installation],
) -> Result<InstallationTarget> {
    let input = match input {
        None => return Ok(InstallationTarget::Default),
        Some(input) if input.eq_ignore_ascii_case(DEFAULT_INSTALLATION_ID) => {
            return Ok(InstallationTarget::Default)
        }
        Some(input) => input,
    };

    let input_lower = input.to_lowercase();
    let input_slug = slugify(input);

    installations
        .iter()
        .find(|i| {
            i.name.to_lowercase() == input_lower
                || (!input_slug.is_empty() && slugify(&i.name) == input_slug)
                || i.id == input
                || i.dir_name == input
        })
        .map(InstallationTarget::from)
        .ok_or_else(|| MultiClaudeError::InstallationNotFound {
            input: input.to_string(),
            available: std::iter::once(DEFAULT_INSTALLATION_ID.to_string())
                .chain(installations.iter().map(|i| i.name.clone()))
                .collect(),
        })
}

/// Short identifier advertised by `--list`: the template id when only one
/// provider uses that template, the name slug otherwise.
pub fn cli_id(provider: &Provider, providers: &[Provider]) -> String {
    let same_template = providers
        .iter()
        .filter(|p| p.template_id == provider.template_id)
        .count();
    if same_template == 1 {
        provider.template_id.clone()
    } else {
        slugify(&provider.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use pretty_assertions::assert_eq;

    fn provider(id: &str, name: &str, template: &str) -> Provider {
        Provider {
            id: id.to_string(),
            name: name.to_string(),
            template_id: template.to_string(),
            kind: if template == "anthropic" {
                ProviderKind::Oauth
            } else {
                ProviderKind::Api
            },
            api_key: "k".to_string(),
            models: vec![],
            base_url: None,
        }
    }

    fn installation(id: &str, name: &str) -> Installation {
        Installation {
            id: id.to_string(),
            name: name.to_string(),
            dir_name: format!("{}-{}", id, slugify(name)),
        }
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let providers = vec![provider("1", "My DeepSeek", "deepseek")];
        assert_eq!(resolve_provider("my deepseek", &providers).unwrap().id, "1");
    }

    #[test]
    fn test_template_id_match() {
        let providers = vec![
            provider("1", "DeepSeek", "deepseek"),
            provider("2", "Kimi", "moonshot"),
        ];
        assert_eq!(resolve_provider("MOONSHOT", &providers).unwrap().id, "2");
        assert_eq!(resolve_provider("deepseek", &providers).unwrap().id, "1");
    }

    #[test]
    fn test_slug_and_id_match() {
        let providers = vec![
            provider("uuid-1", "Work Account", "zai"),
            provider("uuid-2", "Personal", "zai"),
        ];
        assert_eq!(resolve_provider("work-account", &providers).unwrap().id, "uuid-1");
        assert_eq!(resolve_provider("uuid-2", &providers).unwrap().id, "uuid-2");
    }

    #[test]
    fn test_empty_slug_matches_nothing() {
        let providers = vec![provider("1", "工作", "deepseek")];
        assert!(matches!(
            resolve_provider("???", &providers),
            Err(MultiClaudeError::ProviderNotFound { .. })
        ));

        let installs = vec![installation("ab12cd34", "工作")];
        assert!(matches!(
            resolve_installation(Some("???"), &installs),
            Err(MultiClaudeError::InstallationNotFound { .. })
        ));
    }

    #[test]
    fn test_same_name_is_ambiguous() {
        let providers = vec![
            provider("1", "Work", "deepseek"),
            provider("2", "Work", "zai"),
        ];
        match resolve_provider("Work", &providers) {
            Err(MultiClaudeError::AmbiguousProvider { candidates, .. }) => {
                assert_eq!(
                    candidates,
                    vec![
                        ("Work".to_string(), "deepseek".to_string()),
                        ("Work".to_string(), "zai".to_string()),
                    ]
                );
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguity_short_circuits_later_strategies() {
        // Two providers share a template; the id would single one out but the
        // template strategy has already failed
        let providers = vec![
            provider("zai", "One", "zai"),
            provider("2", "Two", "zai"),
        ];
        assert!(matches!(
            resolve_provider("zai", &providers),
            Err(MultiClaudeError::AmbiguousProvider { .. })
        ));
    }

    #[test]
    fn test_not_found_lists_everything() {
        let providers = vec![provider("1", "DeepSeek", "deepseek")];
        match resolve_provider("ghost", &providers) {
            Err(MultiClaudeError::ProviderNotFound { available, .. }) => {
                assert_eq!(available, vec![("DeepSeek".to_string(), "deepseek".to_string())]);
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_model_defaults_to_first_effective() {
        let mut p = provider("1", "DS", "deepseek");
        assert_eq!(resolve_model(None, &p).unwrap().model, "deepseek-chat");
        p.models = vec!["mine".to_string()];
        assert_eq!(resolve_model(None, &p).unwrap().model, "mine");
    }

    #[test]
    fn test_unknown_model_warns_but_proceeds() {
        let p = provider("1", "Z", "zai");
        let choice = resolve_model(Some("glm-x"), &p).unwrap();
        assert_eq!(choice.model, "glm-x");
        let warning = choice.warning.unwrap();
        assert!(warning.contains("GLM-5, GLM-5-Code, GLM-4.7, GLM-4.7-FlashX, GLM-4.6 (and 7 more)"));

        assert!(resolve_model(Some("GLM-5"), &p).unwrap().warning.is_none());
    }

    #[test]
    fn test_model_without_known_list_has_no_warning() {
        let p = provider("1", "OR", "openrouter");
        let choice = resolve_model(Some("x/y"), &p).unwrap();
        assert_eq!(choice.model, "x/y");
        assert!(choice.warning.is_none());
        assert!(matches!(resolve_model(None, &p), Err(MultiClaudeError::NoModels(_))));
    }

    #[test]
    fn test_oauth_model_is_empty() {
        let p = provider("1", "Claude", "anthropic");
        assert_eq!(resolve_model(Some("opus"), &p).unwrap().model, "");
        assert_eq!(resolve_model(None, &p).unwrap().model, "");
    }

    #[test]
    fn test_installation_default_any_case() {
        let installs = vec![installation("ab12cd34", "Work")];
        for input in [None, Some("default"), Some("Default"), Some("DEFAULT")] {
            assert_eq!(
                resolve_installation(input, &installs).unwrap(),
                InstallationTarget::Default
            );
        }
        assert_eq!(resolve_installation(Some("Default"), &[]).unwrap(), InstallationTarget::Default);
    }

    #[test]
    fn test_installation_match_kinds() {
        let installs = vec![installation("ab12cd34", "Client Work")];
        let expected = InstallationTarget::Managed {
            id: "ab12cd34".to_string(),
            dir_name: "ab12cd34-client-work".to_string(),
        };
        for input in ["client work", "client-work", "ab12cd34", "ab12cd34-client-work"] {
            assert_eq!(resolve_installation(Some(input), &installs).unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_installation_not_found() {
        let installs = vec![installation("ab12cd34", "Work")];
        match resolve_installation(Some("home"), &installs) {
            Err(MultiClaudeError::InstallationNotFound { available, .. }) => {
                assert_eq!(available, vec!["default".to_string(), "Work".to_string()]);
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_id() {
        let providers = vec![
            provider("1", "DeepSeek", "deepseek"),
            provider("2", "Z Work", "zai"),
            provider("3", "Z Home", "zai"),
        ];
        assert_eq!(cli_id(&providers[0], &providers), "deepseek");
        assert_eq!(cli_id(&providers[1], &providers), "z-work");
    }
}
